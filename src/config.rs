//! Application credentials, endpoint overrides, and provider quirks.
//!
//! [`OAuthConfig`] is immutable once a provider owns it. Host applications can build it
//! programmatically through [`OAuthConfig::builder`] or deserialize it from any serde format
//! and call [`OAuthConfig::validate`] before handing it to a provider.

/// Builder API for assembling configurations.
pub mod builder;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use quirks::*;

// self
use crate::{
	_prelude::*,
	auth::{PluginId, ProviderId, TokenSecret},
	error::ConfigError,
};

/// Authorization and token endpoints resolved for a provider instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint users are redirected to.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
}

/// Application credentials and per-provider options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthConfig {
	/// Provider identifier (e.g. `linkedin`).
	pub id: ProviderId,
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: TokenSecret,
	/// Overrides the provider's default authorization endpoint.
	#[serde(default)]
	pub authorization_url: Option<Url>,
	/// Overrides the provider's default token endpoint.
	#[serde(default)]
	pub access_token_url: Option<Url>,
	/// Comma-separated scope list used with custom permissions.
	#[serde(default)]
	pub custom_permissions: Option<String>,
	/// Extra plugins appended after the provider's built-in plugins.
	#[serde(default)]
	pub registered_plugins: Vec<PluginId>,
	/// Extra scope tokens requested on behalf of plugins.
	#[serde(default)]
	pub plugin_scopes: Vec<String>,
	/// Keeps the raw provider payload on normalized entities.
	#[serde(default)]
	pub save_raw_response: bool,
}
impl OAuthConfig {
	/// Creates a new builder for the provided identifier and client credentials.
	pub fn builder(
		id: ProviderId,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> OAuthConfigBuilder {
		OAuthConfigBuilder::new(id, client_id, client_secret)
	}

	/// Validates invariants for the configuration.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.client_id.trim().is_empty() {
			return Err(ConfigError::MissingClientId);
		}
		if self.client_secret.is_blank() {
			return Err(ConfigError::MissingClientSecret);
		}
		if let Some(url) = self.authorization_url.as_ref() {
			validate_endpoint("authorization", url)?;
		}
		if let Some(url) = self.access_token_url.as_ref() {
			validate_endpoint("token", url)?;
		}
		if self.custom_permissions.as_deref().is_some_and(|custom| custom.trim().is_empty()) {
			return Err(ConfigError::BlankCustomPermissions);
		}

		for scope in &self.plugin_scopes {
			if scope.is_empty() || scope.chars().any(char::is_whitespace) {
				return Err(ConfigError::InvalidPluginScope { scope: scope.clone() });
			}
		}

		Ok(())
	}

	/// Resolves endpoints, preferring configured overrides over the provider defaults.
	pub fn resolve_endpoints(
		&self,
		default_authorization: &str,
		default_token: &str,
	) -> Result<ProviderEndpoints, ConfigError> {
		let authorization = match self.authorization_url.clone() {
			Some(url) => url,
			None => parse_endpoint("authorization", default_authorization)?,
		};
		let token = match self.access_token_url.clone() {
			Some(url) => url,
			None => parse_endpoint("token", default_token)?,
		};

		Ok(ProviderEndpoints { authorization, token })
	}
}

/// Parses a provider endpoint constant, reporting which endpoint failed.
pub(crate) fn parse_endpoint(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint { endpoint: name, source })
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	if url.scheme() != "https" {
		Err(ConfigError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn config() -> OAuthConfigBuilder {
		OAuthConfig::builder(
			ProviderId::new("linkedin").expect("Provider fixture should be valid."),
			"client",
			"secret",
		)
	}

	#[test]
	fn overrides_win_over_defaults() {
		let config = config()
			.access_token_url(
				Url::parse("https://sso.example.com/token").expect("Override URL should parse."),
			)
			.build()
			.expect("Configuration should build.");
		let endpoints = config
			.resolve_endpoints("https://idp.example.com/authorize", "https://idp.example.com/token")
			.expect("Endpoints should resolve.");

		assert_eq!(endpoints.authorization.as_str(), "https://idp.example.com/authorize");
		assert_eq!(endpoints.token.as_str(), "https://sso.example.com/token");
	}

	#[test]
	fn invalid_default_reports_endpoint_name() {
		let config = config().build().expect("Configuration should build.");
		let err = config
			.resolve_endpoints("not a url", "https://idp.example.com/token")
			.expect_err("Unparseable defaults must be rejected.");

		assert!(matches!(err, ConfigError::InvalidEndpoint { endpoint: "authorization", .. }));
	}

	#[test]
	fn deserialized_configs_default_optional_fields() {
		let config: OAuthConfig = serde_json::from_str(
			r#"{"id":"linkedin","client_id":"client","client_secret":"secret"}"#,
		)
		.expect("Minimal configuration should deserialize.");

		assert!(config.validate().is_ok());
		assert!(config.registered_plugins.is_empty());
		assert!(!config.save_raw_response);
		assert_eq!(config.client_secret.expose(), "secret");
	}
}
