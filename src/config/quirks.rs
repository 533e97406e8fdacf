// self
use crate::_prelude::*;

/// Client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
}

/// Where a bearer strategy attaches the access token on authenticated requests.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPlacement {
	#[default]
	/// `Authorization: Bearer <token>` header.
	BearerHeader,
	/// Query parameter with the given name.
	QueryParameter(String),
}

/// Provider-specific quirks that influence how strategies behave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Client authentication mode at the token endpoint.
	pub client_auth: ClientAuthMethod,
	/// Placement of the access token on authenticated requests.
	pub token_placement: TokenPlacement,
	/// Character used to join scopes when constructing `scope` parameters.
	pub scope_delimiter: char,
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self {
			client_auth: ClientAuthMethod::default(),
			token_placement: TokenPlacement::default(),
			scope_delimiter: ' ',
		}
	}
}
