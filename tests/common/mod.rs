//! Shared fixtures for integration tests: a recording stub transport and LinkedIn documents.

#![allow(dead_code)]

// std
use std::{
	io,
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
};
// crates.io
use parking_lot::Mutex;
// self
use social_auth::{
	auth::{AccessGrant, ProviderId},
	config::{OAuthConfig, OAuthConfigBuilder},
	error::TransportError,
	http::{ApiRequest, ApiResponse, HttpTransport, TransportFuture, endpoint_label},
	plugin::PluginRegistry,
	provider::{AuthProvider, LinkedInProvider},
	url::Url,
};

pub const CLIENT_ID: &str = "client-it";
pub const CLIENT_SECRET: &str = "secret-it";
pub const ACCESS_TOKEN: &str = "token-it";

pub const PROFILE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<person>
  <id>li-42</id>
  <first-name>Grace</first-name>
  <last-name>Hopper</last-name>
  <email-address>grace@example.com</email-address>
  <location><name>Arlington</name></location>
</person>"#;

pub const CONNECTIONS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<connections total="4">
  <person><id>c-1</id><first-name>Ada</first-name></person>
  <person><id>c-2</id><first-name>Alan</first-name></person>
  <person><first-name>Anonymous</first-name></person>
  <person><id>c-4</id><first-name>Edsger</first-name></person>
</connections>"#;

/// Transport that answers from a fixed route table and records every request.
///
/// Routes match on the request URL without its query string. Unknown routes answer 404.
#[derive(Default)]
pub struct StubTransport {
	routes: Mutex<Vec<(String, ApiResponse)>>,
	requests: Mutex<Vec<ApiRequest>>,
	unreachable: AtomicBool,
}
impl StubTransport {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// Answers requests to `url` with `response`; later routes replace earlier ones.
	pub fn route(&self, url: &str, response: ApiResponse) {
		let label = label(url);
		let mut routes = self.routes.lock();

		routes.retain(|(existing, _)| existing != &label);
		routes.push((label, response));
	}

	/// Makes every following request fail before reaching a server.
	pub fn set_unreachable(&self) {
		self.unreachable.store(true, Ordering::SeqCst);
	}

	pub fn requests(&self) -> Vec<ApiRequest> {
		self.requests.lock().clone()
	}

	pub fn requests_to(&self, url: &str) -> Vec<ApiRequest> {
		let label = label(url);

		self.requests.lock().iter().filter(|request| endpoint_label(&request.url) == label).cloned().collect()
	}
}
impl HttpTransport for StubTransport {
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_> {
		let outcome = if self.unreachable.load(Ordering::SeqCst) {
			Err(TransportError::Io(io::Error::new(io::ErrorKind::ConnectionRefused, "stubbed")))
		} else {
			let label = endpoint_label(&request.url);
			let response = self
				.routes
				.lock()
				.iter()
				.find(|(route, _)| route == &label)
				.map(|(_, response)| response.clone())
				.unwrap_or_else(|| ApiResponse::new(404, "not found"));

			Ok(response)
		};

		self.requests.lock().push(request);

		Box::pin(async move { outcome })
	}
}

fn label(url: &str) -> String {
	endpoint_label(&Url::parse(url).expect("Route URL should parse."))
}

pub fn url(value: &str) -> Url {
	Url::parse(value).expect("URL fixture should parse.")
}

pub fn return_url() -> Url {
	url("https://app.example.com/auth/callback")
}

pub fn provider_id() -> ProviderId {
	ProviderId::new("linkedin").expect("Provider fixture should be valid.")
}

pub fn config_builder() -> OAuthConfigBuilder {
	OAuthConfig::builder(provider_id(), CLIENT_ID, CLIENT_SECRET)
}

/// Token endpoint answer in LinkedIn's shape, which carries no `token_type`.
pub fn token_response() -> ApiResponse {
	ApiResponse::new(200, format!(r#"{{"expires_in":5184000,"access_token":"{ACCESS_TOKEN}"}}"#))
		.with_header("content-type", "application/json")
}

pub fn xml(body: &str) -> ApiResponse {
	ApiResponse::new(200, body).with_header("content-type", "text/xml;charset=UTF-8")
}

pub fn linkedin(transport: &Arc<StubTransport>, config: OAuthConfig) -> LinkedInProvider {
	LinkedInProvider::new(config, transport.clone(), &PluginRegistry::default())
		.expect("LinkedIn provider should build.")
}

/// Provider with a restored grant, skipping the handshake.
pub fn authenticated_linkedin(transport: &Arc<StubTransport>) -> LinkedInProvider {
	let mut provider =
		linkedin(transport, config_builder().build().expect("Configuration should build."));

	provider
		.set_access_grant(AccessGrant::bearer(provider_id(), ACCESS_TOKEN))
		.expect("Bearer grant should be accepted.");

	provider
}
