//! Access grants produced by a successful authorization exchange.

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, TokenSecret},
};

/// Credential obtained from a provider after a successful OAuth exchange.
///
/// Bearer strategies only populate [`key`](Self::key); signed (OAuth 1.0a style) strategies
/// also carry a token [`secret`](Self::secret). The grant is the only state a caller may
/// persist to resume a session; see [`AccessGrant::to_json`] and [`AccessGrant::from_json`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
	/// Provider that issued the grant.
	pub provider_id: ProviderId,
	/// Access token (bearer) or token key (signed).
	pub key: TokenSecret,
	/// Token secret for signed strategies.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub secret: Option<TokenSecret>,
	/// Refresh token, if the provider issued one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<TokenSecret>,
	/// Token type reported by the provider (e.g. `bearer`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token_type: Option<String>,
	/// Scope string the provider reported as granted.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
	/// Issued-at instant recorded when the grant was produced.
	pub issued_at: OffsetDateTime,
	/// Expiry instant, when the provider reported a lifetime.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expires_at: Option<OffsetDateTime>,
}
impl AccessGrant {
	/// Creates a bearer grant issued now without expiry metadata.
	pub fn bearer(provider_id: ProviderId, key: impl Into<String>) -> Self {
		Self {
			provider_id,
			key: TokenSecret::new(key),
			secret: None,
			refresh_token: None,
			token_type: Some("bearer".into()),
			scope: None,
			issued_at: OffsetDateTime::now_utc(),
			expires_at: None,
		}
	}

	/// Sets a relative lifetime measured from [`issued_at`](Self::issued_at).
	pub fn with_expires_in(mut self, lifetime: Duration) -> Self {
		self.expires_at = Some(self.issued_at + lifetime);

		self
	}

	/// Returns `true` if the grant carries expiry metadata that has elapsed at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}

	/// Returns `true` if the grant has expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Log-safe fingerprint of the access token.
	pub fn fingerprint(&self) -> String {
		self.key.fingerprint()
	}

	/// Serializes the grant into an opaque JSON blob for session persistence.
	///
	/// The blob contains the raw credential; callers are responsible for storing it securely.
	pub fn to_json(&self) -> Result<String> {
		serde_json::to_string(self)
			.map_err(|e| Error::invalid_grant(format!("grant could not be serialized: {e}")))
	}

	/// Restores a grant previously produced by [`AccessGrant::to_json`].
	pub fn from_json(blob: &str) -> Result<Self> {
		let deserializer = &mut serde_json::Deserializer::from_str(blob);

		serde_path_to_error::deserialize(deserializer).map_err(|e| {
			Error::invalid_grant(format!("stored grant is malformed at `{}`", e.path()))
		})
	}
}
impl Debug for AccessGrant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessGrant")
			.field("provider_id", &self.provider_id)
			.field("key", &"<redacted>")
			.field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
