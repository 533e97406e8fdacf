//! Bridge onto the `oauth2` crate for authorization-code exchanges.
//!
//! Token endpoint semantics (form encoding, client authentication, response parsing) are
//! delegated to `oauth2`; this module only routes its HTTP calls through the crate's
//! [`HttpTransport`] and maps the outcome into an [`AccessGrant`] or the crate error taxonomy.

pub use oauth2;

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AccessToken, AsyncHttpClient, AuthType, AuthUrl, AuthorizationCode, Client, ClientId,
	ClientSecret, EndpointNotSet, EndpointSet, HttpClientError, HttpRequest, HttpResponse,
	RedirectUrl, RefreshToken, RequestTokenError, Scope, StandardRevocableToken, TokenResponse,
	TokenUrl,
	basic::{
		BasicErrorResponse, BasicRequestTokenError, BasicRevocationErrorResponse,
		BasicTokenIntrospectionResponse, BasicTokenType,
	},
	helpers,
	http::{HeaderName, HeaderValue, StatusCode},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessGrant, ProviderId, TokenSecret},
	config::{ClientAuthMethod, ProviderEndpoints},
	error::{ConfigError, TransportError},
	http::{ApiRequest, HttpTransport, endpoint_label},
};

type ConfiguredClient = Client<
	BasicErrorResponse,
	ExchangeTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointSet,
>;
type ExchangeFuture<'c> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, HttpClientError<TransportError>>> + 'c + Send>>;

/// Captures metadata from the most recent token endpoint response for error mapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the token endpoint, if available.
	pub status: Option<u16>,
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between the transport handle and the
/// error mapper.
///
/// A fresh slot is created for every exchange and read immediately after `oauth2` resolves.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<parking_lot::Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// [`AsyncHttpClient`] handle that routes `oauth2` requests through an [`HttpTransport`].
#[derive(Clone)]
pub struct TransportHandle {
	transport: Arc<dyn HttpTransport>,
	slot: ResponseMetadataSlot,
}
impl TransportHandle {
	/// Wraps a transport; outcomes are recorded in `slot`.
	pub fn new(transport: Arc<dyn HttpTransport>, slot: ResponseMetadataSlot) -> Self {
		Self { transport, slot }
	}
}
impl<'c> AsyncHttpClient<'c> for TransportHandle {
	type Error = HttpClientError<TransportError>;
	type Future = ExchangeFuture<'c>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			self.slot.take();

			let request = into_api_request(request).map_err(Box::new)?;
			let response = self.transport.execute(request).await.map_err(Box::new)?;

			self.slot.store(ResponseMetadata { status: Some(response.status) });

			into_http_response(response)
		})
	}
}

/// Token endpoint response that tolerates a missing `token_type`.
///
/// LinkedIn's v1 token endpoint answers with `access_token` and `expires_in` only; an absent
/// token type is read as `bearer`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ExchangeTokenResponse {
	access_token: AccessToken,
	#[serde(
		default = "bearer",
		deserialize_with = "helpers::deserialize_untagged_enum_case_insensitive"
	)]
	token_type: BasicTokenType,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	expires_in: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	refresh_token: Option<RefreshToken>,
	#[serde(
		rename = "scope",
		default,
		deserialize_with = "helpers::deserialize_space_delimited_vec",
		serialize_with = "helpers::serialize_space_delimited_vec",
		skip_serializing_if = "Option::is_none"
	)]
	scopes: Option<Vec<Scope>>,
}
impl TokenResponse for ExchangeTokenResponse {
	type TokenType = BasicTokenType;

	fn access_token(&self) -> &AccessToken {
		&self.access_token
	}

	fn token_type(&self) -> &Self::TokenType {
		&self.token_type
	}

	fn expires_in(&self) -> Option<std::time::Duration> {
		self.expires_in.map(std::time::Duration::from_secs)
	}

	fn refresh_token(&self) -> Option<&RefreshToken> {
		self.refresh_token.as_ref()
	}

	fn scopes(&self) -> Option<&Vec<Scope>> {
		self.scopes.as_ref()
	}
}

fn bearer() -> BasicTokenType {
	BasicTokenType::Bearer
}

/// Client settings needed for an authorization-code exchange.
#[derive(Clone, Debug)]
pub struct ExchangeClient {
	/// Provider that will own the resulting grant.
	pub provider_id: ProviderId,
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: TokenSecret,
	/// Resolved endpoints.
	pub endpoints: ProviderEndpoints,
	/// Client authentication mode at the token endpoint.
	pub client_auth: ClientAuthMethod,
}
impl ExchangeClient {
	fn oauth_client(&self) -> Result<ConfiguredClient> {
		let auth_url = AuthUrl::new(self.endpoints.authorization.to_string()).map_err(|source| {
			ConfigError::InvalidEndpoint { endpoint: "authorization", source }
		})?;
		let token_url = TokenUrl::new(self.endpoints.token.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "token", source })?;
		let mut client = Client::new(ClientId::new(self.client_id.clone()))
			.set_client_secret(ClientSecret::new(self.client_secret.expose().to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url);

		if matches!(self.client_auth, ClientAuthMethod::ClientSecretPost) {
			client = client.set_auth_type(AuthType::RequestBody);
		}

		Ok(client)
	}

	/// Exchanges an authorization code for an access grant.
	pub async fn exchange_code(
		&self,
		transport: Arc<dyn HttpTransport>,
		code: &str,
		redirect_uri: &Url,
	) -> Result<AccessGrant> {
		let endpoint = endpoint_label(&self.endpoints.token);
		let client = self.oauth_client()?;
		let redirect_url = RedirectUrl::new(redirect_uri.to_string()).map_err(|e| {
			Error::invalid_input(format!("redirect URL `{redirect_uri}` is invalid: {e}"))
		})?;
		let slot = ResponseMetadataSlot::default();
		let handle = TransportHandle::new(transport, slot.clone());
		let response = client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.set_redirect_uri(Cow::Owned(redirect_url))
			.request_async(&handle)
			.await
			.map_err(|e| map_request_error(&endpoint, slot.take(), e))?;

		into_grant(self.provider_id.clone(), &endpoint, response)
	}
}

fn into_api_request(request: HttpRequest) -> Result<ApiRequest, TransportError> {
	let method = request.method().as_str().parse()?;
	let url = Url::parse(&request.uri().to_string())
		.map_err(|e| TransportError::request(format!("token request URI is invalid: {e}")))?;
	let mut api_request = ApiRequest::new(method, url);

	for (name, value) in request.headers() {
		let value = value
			.to_str()
			.map_err(|_| TransportError::request(format!("header `{name}` is not visible ASCII")))?;

		api_request = api_request.with_header(name.as_str(), value);
	}

	let body = request.into_body();

	if !body.is_empty() {
		api_request = api_request.with_body(body);
	}

	Ok(api_request)
}

fn into_http_response(
	response: crate::http::ApiResponse,
) -> Result<HttpResponse, HttpClientError<TransportError>> {
	let status = StatusCode::from_u16(response.status)
		.map_err(|e| HttpClientError::Other(format!("invalid status code: {e}")))?;
	let mut http_response = HttpResponse::new(response.body);

	*http_response.status_mut() = status;

	for (name, value) in response.headers {
		if let (Ok(name), Ok(value)) =
			(HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value))
		{
			http_response.headers_mut().insert(name, value);
		}
	}

	Ok(http_response)
}

fn into_grant(
	provider_id: ProviderId,
	endpoint: &str,
	response: ExchangeTokenResponse,
) -> Result<AccessGrant> {
	let issued_at = OffsetDateTime::now_utc();
	let expires_at = match response.expires_in() {
		Some(lifetime) => {
			let secs = i64::try_from(lifetime.as_secs()).map_err(|_| Error::ExchangeFailed {
				endpoint: endpoint.to_owned(),
				status: None,
				reason: "expires_in exceeds the supported range".into(),
			})?;

			Some(issued_at + Duration::seconds(secs))
		},
		None => None,
	};
	let scope = response.scopes().map(|scopes| {
		scopes.iter().map(|scope| scope.as_str()).collect::<Vec<_>>().join(" ")
	});

	Ok(AccessGrant {
		provider_id,
		key: TokenSecret::new(response.access_token().secret().to_owned()),
		secret: None,
		refresh_token: response
			.refresh_token()
			.map(|token| TokenSecret::new(token.secret().to_owned())),
		token_type: Some(response.token_type().as_ref().to_ascii_lowercase()),
		scope,
		issued_at,
		expires_at,
	})
}

fn map_request_error(
	endpoint: &str,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<TransportError>>,
) -> Error {
	let status = meta.and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(endpoint, status, response),
		RequestTokenError::Request(HttpClientError::Reqwest(source)) =>
			Error::Transport { endpoint: endpoint.to_owned(), source: *source },
		RequestTokenError::Request(HttpClientError::Io(source)) =>
			Error::Transport { endpoint: endpoint.to_owned(), source: TransportError::Io(source) },
		RequestTokenError::Request(other) => Error::ExchangeFailed {
			endpoint: endpoint.to_owned(),
			status,
			reason: format!("HTTP client error: {other}"),
		},
		RequestTokenError::Parse(error, _body) => Error::ExchangeFailed {
			endpoint: endpoint.to_owned(),
			status,
			reason: format!("token response is malformed at `{}`", error.path()),
		},
		RequestTokenError::Other(message) => Error::ExchangeFailed {
			endpoint: endpoint.to_owned(),
			status,
			reason: format!("unexpected token endpoint response: {message}"),
		},
	}
}

fn map_server_response_error(
	endpoint: &str,
	status: Option<u16>,
	response: BasicErrorResponse,
) -> Error {
	let reason = match response.error_description() {
		Some(description) => format!("{} ({description})", response.error().as_ref()),
		None => response.error().as_ref().to_owned(),
	};

	Error::ExchangeFailed { endpoint: endpoint.to_owned(), status, reason }
}
