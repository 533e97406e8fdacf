//! Transport primitives shared by token exchanges and authenticated API calls.
//!
//! [`HttpTransport`] is the crate's only dependency on an HTTP stack. Strategies build
//! an [`ApiRequest`] (credential already attached), hand it to the transport, and receive an
//! [`ApiResponse`] whatever the status code; only failures to obtain a response at all are
//! reported as [`TransportError`]. The `oauth` module adapts the same transport to the
//! `oauth2` crate so token exchanges and API calls share one client.

// std
use std::str::Utf8Error;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP clients capable of executing provider requests.
///
/// Implementations must not follow redirects on behalf of the caller and must perform a
/// single attempt per call; retries belong to a higher layer.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes the request and returns the response, whatever its status code.
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_>;
}

/// HTTP methods used against provider APIs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
	#[default]
	/// `GET`.
	Get,
	/// `POST`.
	Post,
	/// `PUT`.
	Put,
	/// `DELETE`.
	Delete,
}
impl HttpMethod {
	/// Returns the method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
			HttpMethod::Put => "PUT",
			HttpMethod::Delete => "DELETE",
		}
	}

	/// Returns true for methods that usually carry a request body.
	pub const fn has_body(self) -> bool {
		matches!(self, HttpMethod::Post | HttpMethod::Put)
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for HttpMethod {
	type Err = TransportError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_uppercase().as_str() {
			"GET" => Ok(HttpMethod::Get),
			"POST" => Ok(HttpMethod::Post),
			"PUT" => Ok(HttpMethod::Put),
			"DELETE" => Ok(HttpMethod::Delete),
			other => Err(TransportError::request(format!("unsupported HTTP method `{other}`"))),
		}
	}
}

/// Fully prepared outbound request.
///
/// Header names are stored lowercase.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: HttpMethod,
	/// Target URL including query parameters.
	pub url: Url,
	/// Request headers.
	pub headers: BTreeMap<String, String>,
	/// Raw request body.
	pub body: Option<Vec<u8>>,
}
impl ApiRequest {
	/// Creates a body-less request.
	pub fn new(method: HttpMethod, url: Url) -> Self {
		Self { method, url, headers: BTreeMap::new(), body: None }
	}

	/// Adds or replaces a header.
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// Sets the raw body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Returns a header value by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Returns the body as text, if present and valid UTF-8.
	pub fn body_text(&self) -> Option<&str> {
		self.body.as_deref().and_then(|body| std::str::from_utf8(body).ok())
	}
}
impl Debug for ApiRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		// Query strings and authorization headers may carry credentials.
		f.debug_struct("ApiRequest")
			.field("method", &self.method)
			.field("endpoint", &endpoint_label(&self.url))
			.field("headers", &self.headers.keys().collect::<Vec<_>>())
			.field("body_len", &self.body.as_ref().map(Vec::len))
			.finish()
	}
}

/// Response returned by a provider.
///
/// Header names are stored lowercase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers.
	pub headers: BTreeMap<String, String>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Creates a response with the given status and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers: BTreeMap::new(), body: body.into() }
	}

	/// Adds or replaces a header.
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// Returns true for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns a header value by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Returns the body as UTF-8 text.
	pub fn text(&self) -> Result<&str, Utf8Error> {
		std::str::from_utf8(&self.body)
	}
}

/// Renders a URL without its query string or fragment so it can be logged or embedded in
/// errors without leaking query-string credentials.
pub fn endpoint_label(url: &Url) -> String {
	let mut label = url.clone();

	label.set_query(None);
	label.set_fragment(None);

	label.into()
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Provider calls should not follow redirects; [`ReqwestHttpClient::new`] disables them.
/// Configure any custom [`ReqwestClient`] the same way before passing it to
/// [`ReqwestHttpClient::with_client`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a client that never follows redirects.
	pub fn new() -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
		let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
			.map_err(|e| TransportError::request(e.to_string()))?;
		let mut builder = self.0.request(method, request.url);

		for (name, value) in &request.headers {
			builder = builder.header(name.as_str(), value.as_str());
		}
		if let Some(body) = request.body {
			builder = builder.body(body);
		}

		let response = builder.send().await?;
		let status = response.status().as_u16();
		let headers = response
			.headers()
			.iter()
			.filter_map(|(name, value)| {
				value.to_str().ok().map(|value| (name.as_str().to_owned(), value.to_owned()))
			})
			.collect();
		let body = response.bytes().await?.to_vec();

		Ok(ApiResponse { status, headers, body })
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_> {
		Box::pin(self.send(request))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn endpoint_label_strips_query_credentials() {
		let url = Url::parse("https://api.example.com/v1/people?oauth2_access_token=secret#frag")
			.expect("Fixture URL should parse.");

		assert_eq!(endpoint_label(&url), "https://api.example.com/v1/people");
	}

	#[test]
	fn request_debug_hides_query_and_header_values() {
		let request = ApiRequest::new(
			HttpMethod::Get,
			Url::parse("https://api.example.com/me?token=secret").expect("Fixture URL should parse."),
		)
		.with_header("Authorization", "Bearer secret");
		let rendered = format!("{request:?}");

		assert!(!rendered.contains("secret"), "{rendered}");
		assert_eq!(request.header("AUTHORIZATION"), Some("Bearer secret"));
	}

	#[test]
	fn methods_parse_case_insensitively() {
		assert_eq!("post".parse::<HttpMethod>().expect("POST should parse."), HttpMethod::Post);
		assert!("PATCH".parse::<HttpMethod>().is_err());
		assert!(HttpMethod::Put.has_body());
		assert!(!HttpMethod::Get.has_body());
	}

	#[test]
	fn response_helpers_classify_status() {
		let response = ApiResponse::new(201, "created").with_header("Content-Type", "text/plain");

		assert!(response.is_success());
		assert_eq!(response.header("content-type"), Some("text/plain"));
		assert_eq!(response.text().expect("Body should be UTF-8."), "created");
		assert!(!ApiResponse::new(404, "").is_success());
	}
}
