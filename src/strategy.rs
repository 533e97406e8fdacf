//! Protocol strategies that build authorization redirects, exchange callbacks for grants, and
//! execute authenticated requests.
//!
//! [`AuthenticationStrategy`] is object safe so providers can hold any protocol variant
//! behind `Arc<dyn AuthenticationStrategy>`. [`ProviderSupport`] is the narrow, cloneable view
//! of a strategy that plugins receive: it can issue authenticated requests but never exposes
//! the grant itself.

pub mod oauth2;

pub use self::oauth2::*;

// self
use crate::{
	_prelude::*,
	auth::{AccessGrant, AntiForgeryState, CallbackParams},
	http::{ApiResponse, HttpMethod, endpoint_label},
};

/// Boxed future returned by strategy, provider, and plugin operations.
pub type OperationFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Protocol-specific engine owned by a provider.
///
/// Implementations keep the current grant behind interior mutability so the provider and
/// every plugin can share one instance.
pub trait AuthenticationStrategy: Send + Sync {
	/// Builds the provider authorization URL embedding client id, return URL, scope, and state.
	fn build_authorization_url(&self, request: &AuthorizationRequest) -> Result<Url>;

	/// Exchanges the callback parameters for an access grant and stores it.
	fn verify<'a>(
		&'a self,
		callback: &'a CallbackParams,
		redirect_uri: &'a Url,
	) -> OperationFuture<'a, AccessGrant>;

	/// Executes a request with the current grant attached as credential.
	///
	/// Fails with [`Error::NotAuthenticated`] without touching the network when no grant is set.
	fn execute_authenticated(&self, call: ApiCall) -> OperationFuture<'_, ApiResponse>;

	/// Replaces the current grant after checking that it fits this strategy.
	fn set_access_grant(&self, grant: AccessGrant) -> Result<()>;

	/// Returns a copy of the current grant.
	fn access_grant(&self) -> Option<AccessGrant>;

	/// Clears the current grant; idempotent.
	fn logout(&self);
}

/// Inputs for [`AuthenticationStrategy::build_authorization_url`].
#[derive(Clone, Debug)]
pub struct AuthorizationRequest {
	/// URL the provider redirects back to.
	pub return_url: Url,
	/// Scope string, already joined with the provider delimiter.
	pub scope: String,
	/// Anti-forgery token embedded as the `state` parameter.
	pub state: AntiForgeryState,
	/// Additional provider-specific query parameters.
	pub extra_params: BTreeMap<String, String>,
}

/// Authenticated API call described independently of any credential.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiCall {
	/// Target URL, without credentials.
	pub url: Url,
	/// HTTP method.
	pub method: HttpMethod,
	/// Parameters sent as a form body for body-carrying methods without an explicit body, and
	/// as query parameters otherwise.
	pub params: BTreeMap<String, String>,
	/// Extra request headers.
	pub headers: BTreeMap<String, String>,
	/// Raw request body.
	pub body: Option<String>,
}
impl ApiCall {
	/// Creates a call with the given method.
	pub fn new(method: HttpMethod, url: Url) -> Self {
		Self { url, method, params: BTreeMap::new(), headers: BTreeMap::new(), body: None }
	}

	/// Creates a `GET` call.
	pub fn get(url: Url) -> Self {
		Self::new(HttpMethod::Get, url)
	}

	/// Creates a `POST` call.
	pub fn post(url: Url) -> Self {
		Self::new(HttpMethod::Post, url)
	}

	/// Adds a parameter.
	pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.insert(name.into(), value.into());

		self
	}

	/// Adds a header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Sets the raw body.
	pub fn with_body(mut self, body: impl Into<String>) -> Self {
		self.body = Some(body.into());

		self
	}
}

/// Authenticated-request capability handed to plugins.
#[derive(Clone)]
pub struct ProviderSupport {
	strategy: Arc<dyn AuthenticationStrategy>,
}
impl ProviderSupport {
	/// Wraps the owning provider's strategy.
	pub fn new(strategy: Arc<dyn AuthenticationStrategy>) -> Self {
		Self { strategy }
	}

	/// Executes an authenticated call through the owning provider's strategy.
	///
	/// The response is returned whatever its status code.
	pub fn api(&self, call: ApiCall) -> OperationFuture<'_, ApiResponse> {
		self.strategy.execute_authenticated(call)
	}

	/// Fetches a provider resource, requiring a 2xx answer.
	///
	/// Non-2xx statuses and transport failures both surface as [`Error::FetchFailed`].
	pub async fn fetch(&self, call: ApiCall) -> Result<ApiResponse> {
		let endpoint = endpoint_label(&call.url);

		match self.api(call).await {
			Ok(response) if response.is_success() => Ok(response),
			Ok(response) =>
				Err(Error::FetchFailed { endpoint, status: Some(response.status), source: None }),
			Err(Error::Transport { source, .. }) =>
				Err(Error::FetchFailed { endpoint, status: None, source: Some(source) }),
			Err(e) => Err(e),
		}
	}
}
impl Debug for ProviderSupport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderSupport")
			.field("authenticated", &self.strategy.access_grant().is_some())
			.finish()
	}
}
