//! OAuth 2.0 authorization-code strategy with bearer credentials.

// self
use crate::{
	_prelude::*,
	auth::{AccessGrant, CallbackParams},
	config::{OAuthConfig, ProviderEndpoints, ProviderQuirks, TokenPlacement},
	http::{ApiRequest, ApiResponse, HttpTransport, endpoint_label},
	oauth::ExchangeClient,
	strategy::{ApiCall, AuthenticationStrategy, AuthorizationRequest, OperationFuture},
};

/// Strategy for providers that issue a bearer access token from an authorization code.
///
/// The token is attached according to the provider's [`TokenPlacement`]. The grant lives
/// behind a lock that is never held across an `.await`.
pub struct OAuth2Strategy {
	exchange: ExchangeClient,
	token_placement: TokenPlacement,
	transport: Arc<dyn HttpTransport>,
	grant: RwLock<Option<AccessGrant>>,
}
impl OAuth2Strategy {
	/// Creates a strategy for the configured client and resolved endpoints.
	pub fn new(
		config: &OAuthConfig,
		endpoints: ProviderEndpoints,
		quirks: &ProviderQuirks,
		transport: Arc<dyn HttpTransport>,
	) -> Self {
		Self {
			exchange: ExchangeClient {
				provider_id: config.id.clone(),
				client_id: config.client_id.clone(),
				client_secret: config.client_secret.clone(),
				endpoints,
				client_auth: quirks.client_auth,
			},
			token_placement: quirks.token_placement.clone(),
			transport,
			grant: RwLock::new(None),
		}
	}

	/// Returns the endpoints this strategy talks to.
	pub fn endpoints(&self) -> &ProviderEndpoints {
		&self.exchange.endpoints
	}

	fn authorize(&self, call: ApiCall, grant: &AccessGrant) -> ApiRequest {
		let ApiCall { mut url, method, params, headers, body } = call;
		let form_body = method.has_body() && body.is_none() && !params.is_empty();

		if !form_body && !params.is_empty() {
			url.query_pairs_mut().extend_pairs(&params);
		}
		if let TokenPlacement::QueryParameter(name) = &self.token_placement {
			url.query_pairs_mut().append_pair(name, grant.key.expose());
		}

		let mut request = ApiRequest::new(method, url);

		for (name, value) in headers {
			request = request.with_header(name, value);
		}

		if matches!(self.token_placement, TokenPlacement::BearerHeader) {
			request = request.with_header("authorization", format!("Bearer {}", grant.key.expose()));
		}

		if form_body {
			let encoded =
				url::form_urlencoded::Serializer::new(String::new()).extend_pairs(&params).finish();

			if request.header("content-type").is_none() {
				request = request.with_header("content-type", "application/x-www-form-urlencoded");
			}

			request = request.with_body(encoded);
		} else if let Some(body) = body {
			request = request.with_body(body);
		}

		request
	}
}
impl AuthenticationStrategy for OAuth2Strategy {
	fn build_authorization_url(&self, request: &AuthorizationRequest) -> Result<Url> {
		let mut url = self.exchange.endpoints.authorization.clone();

		{
			let mut query = url.query_pairs_mut();

			query
				.append_pair("response_type", "code")
				.append_pair("client_id", &self.exchange.client_id)
				.append_pair("redirect_uri", request.return_url.as_str());

			if !request.scope.is_empty() {
				query.append_pair("scope", &request.scope);
			}

			query.append_pair("state", request.state.as_str());

			for (name, value) in &request.extra_params {
				query.append_pair(name, value);
			}
		}

		Ok(url)
	}

	fn verify<'a>(
		&'a self,
		callback: &'a CallbackParams,
		redirect_uri: &'a Url,
	) -> OperationFuture<'a, AccessGrant> {
		Box::pin(async move {
			if let Some(error) = callback.get(CallbackParams::ERROR) {
				let reason = match callback.get(CallbackParams::ERROR_DESCRIPTION) {
					Some(description) => format!("{error} ({description})"),
					None => error.to_owned(),
				};

				return Err(Error::ExchangeFailed {
					endpoint: endpoint_label(&self.exchange.endpoints.authorization),
					status: None,
					reason,
				});
			}

			let code = callback.code().filter(|code| !code.is_empty()).ok_or_else(|| {
				Error::invalid_input("callback does not carry an authorization code")
			})?;
			let grant =
				self.exchange.exchange_code(self.transport.clone(), code, redirect_uri).await?;

			*self.grant.write() = Some(grant.clone());

			tracing::debug!(fingerprint = %grant.fingerprint(), "Stored exchanged access grant.");

			Ok(grant)
		})
	}

	fn execute_authenticated(&self, call: ApiCall) -> OperationFuture<'_, ApiResponse> {
		Box::pin(async move {
			let endpoint = endpoint_label(&call.url);
			let grant = self.grant.read().clone();
			let grant = grant.ok_or_else(|| Error::NotAuthenticated { endpoint: endpoint.clone() })?;
			let request = self.authorize(call, &grant);

			self.transport.execute(request).await.map_err(|source| Error::Transport { endpoint, source })
		})
	}

	fn set_access_grant(&self, grant: AccessGrant) -> Result<()> {
		if grant.provider_id != self.exchange.provider_id {
			return Err(Error::invalid_grant(format!(
				"grant was issued by `{}`, expected `{}`",
				grant.provider_id, self.exchange.provider_id
			)));
		}
		if grant.key.is_blank() {
			return Err(Error::invalid_grant("bearer grant has an empty access token"));
		}
		if grant.secret.is_some() {
			return Err(Error::invalid_grant("bearer grant must not carry a token secret"));
		}

		tracing::debug!(fingerprint = %grant.fingerprint(), "Restored access grant.");

		*self.grant.write() = Some(grant);

		Ok(())
	}

	fn access_grant(&self) -> Option<AccessGrant> {
		self.grant.read().clone()
	}

	fn logout(&self) {
		self.grant.write().take();
	}
}
impl Debug for OAuth2Strategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Strategy")
			.field("provider_id", &self.exchange.provider_id)
			.field("endpoints", &self.exchange.endpoints)
			.field("token_placement", &self.token_placement)
			.field("grant", &self.grant.read().as_ref().map(AccessGrant::fingerprint))
			.finish()
	}
}
