//! LinkedIn OAuth 2.0 provider (profile, connections, and shares over the v1 XML API).

// self
use crate::{
	_prelude::*,
	auth::{
		AccessGrant, CallbackParams, PendingAuthorization, Permission, PluginId, ProviderId,
		ScopeTable, build_scope,
	},
	config::{self, ClientAuthMethod, OAuthConfig, ProviderQuirks, TokenPlacement},
	http::{ApiResponse, HttpTransport, endpoint_label},
	model::{Contact, Profile, StatusUpdate},
	normalize,
	obs::{self, OperationKind},
	plugin::{self, PluginRegistry, PluginSet},
	provider::{AuthProvider, Session, SessionState},
	strategy::{
		ApiCall, AuthenticationStrategy, AuthorizationRequest, OAuth2Strategy, OperationFuture,
		ProviderSupport,
	},
};

/// Default authorization endpoint.
pub const AUTHORIZATION_URL: &str = "https://www.linkedin.com/uas/oauth2/authorization";
/// Default token endpoint.
pub const TOKEN_URL: &str = "https://www.linkedin.com/uas/oauth2/accessToken";
/// Profile projection fetched after verification.
pub const PROFILE_URL: &str = "https://api.linkedin.com/v1/people/~:(id,first-name,last-name,languages,date-of-birth,picture-url,email-address,location:(name),phone-numbers,main-address)";
/// Connections projection.
pub const CONNECTIONS_URL: &str = "https://api.linkedin.com/v1/people/~/connections:(id,first-name,last-name,public-profile-url,picture-url)";
/// Share endpoint used for status updates.
pub const UPDATE_STATUS_URL: &str = "https://api.linkedin.com/v1/people/~/shares";
/// Maximum status length in characters; longer messages are truncated.
pub const MAX_STATUS_LENGTH: usize = 700;
/// Content type of the status update body.
pub const STATUS_CONTENT_TYPE: &str = "text/xml;charset=UTF-8";
/// Query parameter carrying the access token.
pub const ACCESS_TOKEN_PARAM: &str = "oauth2_access_token";
/// Scopes per permission level.
pub const SCOPES: ScopeTable = ScopeTable {
	authenticate_only: &["r_fullprofile", "r_emailaddress"],
	all: &["r_fullprofile", "r_emailaddress", "r_network", "r_contactinfo", "rw_nus"],
};

/// LinkedIn provider quirks: client secret in the form body, token as a query parameter.
pub fn quirks() -> ProviderQuirks {
	ProviderQuirks {
		client_auth: ClientAuthMethod::ClientSecretPost,
		token_placement: TokenPlacement::QueryParameter(ACCESS_TOKEN_PARAM.into()),
		scope_delimiter: ' ',
	}
}

/// Builds the share document for an already truncated message.
pub fn status_body(message: &str) -> String {
	format!(
		"<?xml version=\"1.0\" encoding=\"UTF-8\"?><share><comment>{}</comment><visibility><code>anyone</code></visibility></share>",
		escape_xml(message)
	)
}

fn escape_xml(text: &str) -> String {
	let mut buf = String::with_capacity(text.len());

	for ch in text.chars() {
		match ch {
			'&' => buf.push_str("&amp;"),
			'<' => buf.push_str("&lt;"),
			'>' => buf.push_str("&gt;"),
			_ => buf.push(ch),
		}
	}

	buf
}

fn truncate_chars(text: &str, limit: usize) -> (&str, bool) {
	match text.char_indices().nth(limit) {
		Some((idx, _)) => (&text[..idx], true),
		None => (text, false),
	}
}

/// LinkedIn provider bound to one session.
#[derive(Debug)]
pub struct LinkedInProvider {
	config: OAuthConfig,
	strategy: Arc<OAuth2Strategy>,
	support: ProviderSupport,
	session: Session,
	plugin_scopes: Vec<String>,
	plugins: PluginSet,
}
impl LinkedInProvider {
	/// Validates `config` and builds a provider with plugins resolved from `registry`.
	///
	/// A configured custom permission string makes [`Permission::Custom`] the initial level.
	pub fn new(
		config: OAuthConfig,
		transport: Arc<dyn HttpTransport>,
		registry: &PluginRegistry,
	) -> Result<Self> {
		config.validate()?;

		let endpoints = config.resolve_endpoints(AUTHORIZATION_URL, TOKEN_URL)?;
		let strategy = Arc::new(OAuth2Strategy::new(&config, endpoints, &quirks(), transport));
		let support = ProviderSupport::new(strategy.clone());
		let permission = if config.custom_permissions.is_some() {
			Permission::Custom
		} else {
			Permission::Default
		};
		let plugin_ids = plugins_list(&config);
		let plugins = registry.instantiate(&plugin_ids, &support);
		let plugin_scopes = registry
			.scopes_for(&plugin_ids)
			.map(str::to_owned)
			.chain(config.plugin_scopes.iter().cloned())
			.collect();

		Ok(Self {
			config,
			strategy,
			support,
			session: Session::new(permission),
			plugin_scopes,
			plugins,
		})
	}

	/// Session record backing the state machine.
	pub fn session(&self) -> &Session {
		&self.session
	}

	fn endpoint(name: &'static str, raw: &str) -> Result<Url> {
		Ok(config::parse_endpoint(name, raw)?)
	}

	async fn fetch_profile(&mut self) -> Result<Profile> {
		let url = Self::endpoint("profile", PROFILE_URL)?;

		self.session.require_authenticated(&endpoint_label(&url))?;

		let response = self.support.fetch(ApiCall::get(url.clone())).await?;
		let save_raw = self.config.save_raw_response;
		let mut profile = normalize::decode(&url, &response, |body| {
			normalize::linkedin::profile(body, save_raw)
		})?;

		profile.provider_id = Some(self.config.id.clone());

		tracing::debug!(provider = %self.config.id, "Fetched user profile.");

		self.session.cache_profile(profile.clone());

		Ok(profile)
	}
}
impl AuthProvider for LinkedInProvider {
	fn provider_id(&self) -> &ProviderId {
		&self.config.id
	}

	fn state(&self) -> SessionState {
		self.session.state()
	}

	fn login_redirect_url(&mut self, return_url: &Url) -> Result<Url> {
		obs::observe_sync(OperationKind::Authorize, "linkedin.login_redirect_url", || {
			let scope = self.scope()?;
			let request = AuthorizationRequest {
				return_url: return_url.clone(),
				scope,
				state: self.session.anti_forgery().clone(),
				extra_params: BTreeMap::new(),
			};
			let url = self.strategy.build_authorization_url(&request)?;

			self.session.begin_authorization(return_url.clone())?;

			tracing::debug!(
				provider = %self.config.id,
				permission = %self.session.permission(),
				"Issued authorization redirect."
			);

			Ok(url)
		})
	}

	fn verify_response<'a>(
		&'a mut self,
		callback: &'a CallbackParams,
	) -> OperationFuture<'a, Profile> {
		Box::pin(obs::observe(OperationKind::Verify, "linkedin.verify_response", async move {
			let authorization = endpoint_label(&self.strategy.endpoints().authorization);
			let redirect_uri = self.session.check_callback(callback, &authorization)?;
			let grant = self.strategy.verify(callback, &redirect_uri).await?;

			self.session.authenticate();

			tracing::info!(
				provider = %self.config.id,
				fingerprint = %grant.fingerprint(),
				"Verified authorization callback."
			);

			self.fetch_profile().await
		}))
	}

	fn user_profile(&mut self) -> OperationFuture<'_, Profile> {
		Box::pin(obs::observe(OperationKind::Profile, "linkedin.user_profile", async move {
			if let Some(profile) = self.session.profile() {
				return Ok(profile.clone());
			}

			self.fetch_profile().await
		}))
	}

	fn contact_list(&self) -> OperationFuture<'_, Vec<Contact>> {
		Box::pin(obs::observe(OperationKind::Contacts, "linkedin.contact_list", async move {
			let url = Self::endpoint("connections", CONNECTIONS_URL)?;

			self.session.require_authenticated(&endpoint_label(&url))?;

			let response = self.support.fetch(ApiCall::get(url.clone())).await?;
			let save_raw = self.config.save_raw_response;
			let contacts = normalize::decode(&url, &response, |body| {
				normalize::linkedin::contacts(body, save_raw)
			})?;

			tracing::debug!(count = contacts.len(), "Fetched connections.");

			Ok(contacts)
		}))
	}

	fn update_status<'a>(&'a self, message: &'a str) -> OperationFuture<'a, StatusUpdate> {
		Box::pin(obs::observe(OperationKind::StatusUpdate, "linkedin.update_status", async move {
			let url = Self::endpoint("status", UPDATE_STATUS_URL)?;

			self.session.require_authenticated(&endpoint_label(&url))?;

			if message.trim().is_empty() {
				return Err(Error::invalid_input("status cannot be blank"));
			}

			let (text, truncated) = truncate_chars(message, MAX_STATUS_LENGTH);

			if truncated {
				tracing::warn!(
					limit = MAX_STATUS_LENGTH,
					length = message.chars().count(),
					"Status exceeds the provider limit and was truncated."
				);
			}

			let call = ApiCall::post(url)
				.with_header("Content-Type", STATUS_CONTENT_TYPE)
				.with_body(status_body(text));
			let response = self.support.fetch(call).await?;

			tracing::info!(status = response.status, truncated, "Updated status.");

			Ok(StatusUpdate { response, effective_length: text.chars().count(), truncated })
		}))
	}

	fn api(&self, call: ApiCall) -> OperationFuture<'_, ApiResponse> {
		Box::pin(obs::observe(OperationKind::Api, "linkedin.api", async move {
			self.session.require_authenticated(&endpoint_label(&call.url))?;

			self.support.api(call).await
		}))
	}

	fn permission(&self) -> Permission {
		self.session.permission()
	}

	fn set_permission(&mut self, permission: Permission) {
		tracing::debug!(%permission, "Permission requested.");

		self.session.set_permission(permission);
	}

	fn scope(&self) -> Result<String> {
		build_scope(
			self.session.permission(),
			&SCOPES,
			self.config.custom_permissions.as_deref(),
			self.plugin_scopes.iter().map(String::as_str),
			quirks().scope_delimiter,
		)
	}

	fn access_grant(&self) -> Option<AccessGrant> {
		self.strategy.access_grant()
	}

	fn set_access_grant(&mut self, grant: AccessGrant) -> Result<()> {
		self.strategy.set_access_grant(grant)?;
		self.session.authenticate();

		Ok(())
	}

	fn logout(&mut self) {
		self.strategy.logout();
		self.session.logout();
	}

	fn plugins_list(&self) -> Vec<PluginId> {
		plugins_list(&self.config)
	}

	fn plugins(&self) -> &PluginSet {
		&self.plugins
	}

	fn pending_authorization(&self) -> Option<PendingAuthorization> {
		self.session.pending()
	}

	fn resume_authorization(&mut self, pending: PendingAuthorization) -> Result<()> {
		self.session.resume(pending)
	}
}

fn plugins_list(config: &OAuthConfig) -> Vec<PluginId> {
	[plugin::linkedin::FEED_PLUGIN_ID, plugin::linkedin::CAREER_PLUGIN_ID]
		.into_iter()
		.map(PluginId::from_static)
		.chain(config.registered_plugins.iter().cloned())
		.collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_body_escapes_markup() {
		assert_eq!(
			status_body("Fish & <chips>"),
			"<?xml version=\"1.0\" encoding=\"UTF-8\"?><share><comment>Fish &amp; &lt;chips&gt;</comment><visibility><code>anyone</code></visibility></share>"
		);
	}

	#[test]
	fn truncation_counts_characters() {
		assert_eq!(truncate_chars("héllo", 5), ("héllo", false));
		assert_eq!(truncate_chars("héllo", 2), ("hé", true));
		assert_eq!(truncate_chars("", 0), ("", false));
	}

	#[test]
	fn quirks_place_token_in_query() {
		let quirks = quirks();

		assert_eq!(quirks.client_auth, ClientAuthMethod::ClientSecretPost);
		assert_eq!(
			quirks.token_placement,
			TokenPlacement::QueryParameter(ACCESS_TOKEN_PARAM.into())
		);
	}
}
