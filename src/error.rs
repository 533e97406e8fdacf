//! Crate-level error types shared across strategies, providers, and plugins.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Endpoint strings never carry query parameters, so credentials attached to a request URL
/// cannot leak through error messages.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// Caller-supplied data violates a precondition.
	#[error("Invalid input: {reason}.")]
	InvalidInput {
		/// Human readable description of the violated precondition.
		reason: String,
	},
	/// Operation requires an access grant that is absent.
	#[error("Not authenticated; `{endpoint}` requires an access grant.")]
	NotAuthenticated {
		/// Endpoint the caller attempted to reach.
		endpoint: String,
	},
	/// Callback `state` did not match the value issued for this session.
	#[error("Anti-forgery state mismatch on the callback from `{endpoint}`.")]
	StateMismatch {
		/// Authorization endpoint the callback claims to originate from.
		endpoint: String,
	},
	/// Authorization grant could not be exchanged for an access grant.
	#[error("Token exchange with `{endpoint}` failed: {reason}.")]
	ExchangeFailed {
		/// Token endpoint.
		endpoint: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Provider- or crate-supplied reason string.
		reason: String,
	},
	/// Network or protocol failure while reaching the provider.
	#[error("Transport failure while calling `{endpoint}`.")]
	Transport {
		/// Endpoint being called.
		endpoint: String,
		/// Underlying transport failure.
		#[source]
		source: TransportError,
	},
	/// Provider resource could not be fetched.
	#[error("Failed to fetch `{endpoint}`{}.", display_status(.status))]
	FetchFailed {
		/// Endpoint being fetched.
		endpoint: String,
		/// HTTP status code, when the provider answered.
		status: Option<u16>,
		/// Transport failure, when the provider could not be reached.
		#[source]
		source: Option<TransportError>,
	},
	/// Response body could not be parsed into the expected shape.
	#[error("Malformed response from `{endpoint}`.")]
	MalformedResponse {
		/// Endpoint that produced the response.
		endpoint: String,
		/// HTTP status code of the response.
		status: Option<u16>,
		/// Parsing failure.
		#[source]
		source: NormalizeError,
	},
	/// Optional capability could not be resolved.
	#[error("Plugin `{plugin}` is unavailable: {reason}.")]
	PluginUnavailable {
		/// Plugin identifier.
		plugin: String,
		/// Why the plugin could not be resolved.
		reason: String,
	},
	/// Supplied access grant does not fit the strategy in use.
	#[error("Access grant rejected: {reason}.")]
	InvalidGrant {
		/// Description of the mismatch.
		reason: String,
	},
}
impl Error {
	/// Builds an [`Error::InvalidInput`] from any displayable reason.
	pub fn invalid_input(reason: impl Into<String>) -> Self {
		Self::InvalidInput { reason: reason.into() }
	}

	/// Builds an [`Error::InvalidGrant`] from any displayable reason.
	pub fn invalid_grant(reason: impl Into<String>) -> Self {
		Self::InvalidGrant { reason: reason.into() }
	}

	/// Returns the HTTP status code attached to the error, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::ExchangeFailed { status, .. }
			| Self::FetchFailed { status, .. }
			| Self::MalformedResponse { status, .. } => *status,
			_ => None,
		}
	}

	/// Returns the endpoint attached to the error, if any.
	pub fn endpoint(&self) -> Option<&str> {
		match self {
			Self::NotAuthenticated { endpoint }
			| Self::StateMismatch { endpoint }
			| Self::ExchangeFailed { endpoint, .. }
			| Self::Transport { endpoint, .. }
			| Self::FetchFailed { endpoint, .. }
			| Self::MalformedResponse { endpoint, .. } => Some(endpoint),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised while constructing providers.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Client identifier is empty.
	#[error("Client identifier cannot be empty.")]
	MissingClientId,
	/// Client secret is empty.
	#[error("Client secret cannot be empty.")]
	MissingClientSecret,
	/// Endpoint string cannot be parsed.
	#[error("The {endpoint} endpoint is not a valid URL.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Custom permission string is blank.
	#[error("Custom permissions cannot be blank.")]
	BlankCustomPermissions,
	/// Plugin scope token is malformed.
	#[error("Plugin scope `{scope}` is invalid.")]
	InvalidPluginScope {
		/// The offending scope string.
		scope: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, request construction).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request could not be translated for the underlying client.
	#[error("Request could not be built: {reason}.")]
	Request {
		/// Description of the translation failure.
		reason: String,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Builds a request translation failure.
	pub fn request(reason: impl Into<String>) -> Self {
		Self::Request { reason: reason.into() }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		// reqwest embeds the request URL, which may carry a query-string credential.
		Self::network(e.without_url())
	}
}

/// Document-level parsing failures raised by the response normalizer.
#[derive(Debug, ThisError)]
pub enum NormalizeError {
	/// Body is not valid UTF-8.
	#[error("Response body is not valid UTF-8.")]
	Utf8(#[from] std::str::Utf8Error),
	/// Body is not well-formed XML.
	#[error("Response body is not well-formed XML.")]
	Xml(#[from] roxmltree::Error),
	/// Body is not valid JSON.
	#[error("Response body is not valid JSON.")]
	Json(#[from] serde_json::Error),
	/// Document has an unexpected top-level shape.
	#[error("Expected {expected} at the document root.")]
	UnexpectedShape {
		/// Description of the expected shape.
		expected: &'static str,
	},
	/// A single-entity document lacks its identity field.
	#[error("The {entity} document has no identity field.")]
	MissingIdentity {
		/// Entity name.
		entity: &'static str,
	},
}

fn display_status(status: &Option<u16>) -> String {
	match status {
		Some(code) => format!(" (HTTP {code})"),
		None => String::new(),
	}
}
