#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
// self
use social_auth::{
	auth::{AccessGrant, CallbackParams, ProviderId, TokenSecret},
	config::{ClientAuthMethod, OAuthConfig, ProviderEndpoints, ProviderQuirks},
	error::{Error, TransportError},
	http::{ApiRequest, HttpMethod, HttpTransport, ReqwestHttpClient},
	oauth::ExchangeClient,
	strategy::{ApiCall, AuthenticationStrategy, OAuth2Strategy},
	url::Url,
};

const CLIENT_ID: &str = "client-it";
const CLIENT_SECRET: &str = "secret-it";

fn provider_id() -> ProviderId {
	ProviderId::new("mock-http").expect("Provider identifier should be valid for transport test.")
}

fn endpoints(server: &MockServer) -> ProviderEndpoints {
	ProviderEndpoints {
		authorization: Url::parse(&server.url("/authorize"))
			.expect("Mock authorization endpoint should parse successfully."),
		token: Url::parse(&server.url("/token"))
			.expect("Mock token endpoint should parse successfully."),
	}
}

fn client() -> Arc<ReqwestHttpClient> {
	Arc::new(ReqwestHttpClient::new().expect("Reqwest client should build."))
}

#[tokio::test]
async fn transport_forwards_requests_and_returns_any_status() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v1/people/~/shares")
				.header("content-type", "text/xml;charset=UTF-8")
				.body("<share/>");
			then.status(403).header("X-Trace", "abc").body("<error>throttle</error>");
		})
		.await;
	let request = ApiRequest::new(
		HttpMethod::Post,
		Url::parse(&server.url("/v1/people/~/shares")).expect("Mock URL should parse."),
	)
	.with_header("Content-Type", "text/xml;charset=UTF-8")
	.with_body("<share/>");
	let response = client().execute(request).await.expect("Non-2xx statuses should resolve.");

	mock.assert_async().await;

	assert_eq!(response.status, 403);
	assert_eq!(response.header("x-trace"), Some("abc"));
	assert_eq!(response.text().expect("Body should be UTF-8."), "<error>throttle</error>");
}

#[tokio::test]
async fn transport_does_not_follow_redirects() {
	let server = MockServer::start_async().await;
	let target = server
		.mock_async(|when, then| {
			when.method(GET).path("/landing");
			then.status(200);
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/moved");
			then.status(302).header("location", server.url("/landing"));
		})
		.await;

	let response = client()
		.execute(ApiRequest::new(
			HttpMethod::Get,
			Url::parse(&server.url("/moved")).expect("Mock URL should parse."),
		))
		.await
		.expect("Redirect responses should resolve.");

	assert_eq!(response.status, 302);
	assert_eq!(target.hits_async().await, 0);
}

#[tokio::test]
async fn unreachable_hosts_map_to_network_errors_without_credentials() {
	let url = Url::parse("http://127.0.0.1:9/v1/people?oauth2_access_token=leaky")
		.expect("Unreachable URL should parse.");
	let err = client()
		.execute(ApiRequest::new(HttpMethod::Get, url))
		.await
		.expect_err("Unreachable hosts should fail.");

	assert!(matches!(err, TransportError::Network { .. }));
	assert!(!format!("{err:?}").contains("leaky"));
}

#[tokio::test]
async fn code_exchange_posts_client_credentials_in_the_body() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("content-type", "application/x-www-form-urlencoded")
				.body_includes("grant_type=authorization_code")
				.body_includes("code=valid-code")
				.body_includes("client_secret=secret-it");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"access-success\",\"token_type\":\"bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let exchange = ExchangeClient {
		provider_id: provider_id(),
		client_id: CLIENT_ID.into(),
		client_secret: TokenSecret::new(CLIENT_SECRET),
		endpoints: endpoints(&server),
		client_auth: ClientAuthMethod::ClientSecretPost,
	};
	let grant = exchange
		.exchange_code(
			client(),
			"valid-code",
			&Url::parse("https://app.example.com/callback").expect("Redirect URI should parse."),
		)
		.await
		.expect("Authorization code exchange should succeed.");

	mock.assert_async().await;

	assert_eq!(grant.key.expose(), "access-success");
	assert_eq!(grant.token_type.as_deref(), Some("bearer"));
	assert!(grant.expires_at.is_some_and(|expires_at| expires_at > grant.issued_at));
}

#[tokio::test]
async fn code_exchange_maps_provider_errors() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400).header("content-type", "application/json").body(
				"{\"error\":\"invalid_grant\",\"error_description\":\"code was already redeemed\"}",
			);
		})
		.await;

	let config = OAuthConfig::builder(provider_id(), CLIENT_ID, CLIENT_SECRET)
		.build()
		.expect("Configuration should build.");
	let strategy =
		OAuth2Strategy::new(&config, endpoints(&server), &ProviderQuirks::default(), client());
	let callback: CallbackParams = [("code", "stale-code")].into_iter().collect();
	let err = strategy
		.verify(
			&callback,
			&Url::parse("https://app.example.com/callback").expect("Redirect URI should parse."),
		)
		.await
		.expect_err("Redeemed codes should be rejected.");

	assert!(matches!(
		err,
		Error::ExchangeFailed { status: Some(400), ref reason, .. }
			if reason == "invalid_grant (code was already redeemed)"
	));
	assert!(strategy.access_grant().is_none());
}

#[tokio::test]
async fn bearer_placement_sends_the_authorization_header() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/me")
				.query_param("fields", "id")
				.header("authorization", "Bearer access-success");
			then.status(200).body("{}");
		})
		.await;
	let config = OAuthConfig::builder(provider_id(), CLIENT_ID, CLIENT_SECRET)
		.build()
		.expect("Configuration should build.");
	let strategy =
		OAuth2Strategy::new(&config, endpoints(&server), &ProviderQuirks::default(), client());

	strategy
		.set_access_grant(AccessGrant::bearer(provider_id(), "access-success"))
		.expect("Bearer grant should be accepted.");

	let response = strategy
		.execute_authenticated(
			ApiCall::get(Url::parse(&server.url("/me")).expect("Mock URL should parse."))
				.with_param("fields", "id"),
		)
		.await
		.expect("Authenticated call should resolve.");

	mock.assert_async().await;

	assert_eq!(response.status, 200);
}
