//! Identity providers behind one capability-set trait.
//!
//! Each provider owns a [`Session`], one
//! [`AuthenticationStrategy`](crate::strategy::AuthenticationStrategy), and the plugins built
//! for it. Providers are selected by value through [`ProviderKind`].

pub mod linkedin;
pub mod session;

pub use linkedin::LinkedInProvider;
pub use session::*;

// self
use crate::{
	_prelude::*,
	auth::{AccessGrant, CallbackParams, PendingAuthorization, Permission, PluginId, ProviderId},
	config::OAuthConfig,
	http::{ApiResponse, HttpTransport},
	model::{Contact, Profile, StatusUpdate},
	plugin::{PluginRegistry, PluginSet},
	strategy::{ApiCall, OperationFuture},
};

/// Login, verification, and authenticated operations offered by every provider.
///
/// Mutating operations take `&mut self`: a provider instance serves one session and is not
/// meant to be driven from several tasks at once.
pub trait AuthProvider: Send + Sync {
	/// Configured provider identifier.
	fn provider_id(&self) -> &ProviderId;

	/// Current session state.
	fn state(&self) -> SessionState;

	/// Builds the authorization redirect and moves the session to
	/// [`SessionState::AwaitingCallback`].
	fn login_redirect_url(&mut self, return_url: &Url) -> Result<Url>;

	/// Validates the callback, exchanges it for a grant, and fetches the profile.
	fn verify_response<'a>(
		&'a mut self,
		callback: &'a CallbackParams,
	) -> OperationFuture<'a, Profile>;

	/// Returns the cached profile, fetching it when it is not cached yet.
	fn user_profile(&mut self) -> OperationFuture<'_, Profile>;

	/// Fetches the user's connections in provider order.
	fn contact_list(&self) -> OperationFuture<'_, Vec<Contact>>;

	/// Posts a status update, truncating it to the provider limit.
	fn update_status<'a>(&'a self, message: &'a str) -> OperationFuture<'a, StatusUpdate>;

	/// Executes an arbitrary authenticated call.
	fn api(&self, call: ApiCall) -> OperationFuture<'_, ApiResponse>;

	/// Requested permission level.
	fn permission(&self) -> Permission;

	/// Changes the permission used by the next authorization redirect.
	fn set_permission(&mut self, permission: Permission);

	/// Scope string the next authorization redirect will request.
	fn scope(&self) -> Result<String>;

	/// Current grant, for session persistence.
	fn access_grant(&self) -> Option<AccessGrant>;

	/// Restores a persisted grant and moves the session to [`SessionState::Authenticated`].
	fn set_access_grant(&mut self, grant: AccessGrant) -> Result<()>;

	/// Clears the grant and the cached profile.
	fn logout(&mut self);

	/// Built-in plugin identifiers followed by the configured ones.
	fn plugins_list(&self) -> Vec<PluginId>;

	/// Plugins instantiated for this provider.
	fn plugins(&self) -> &PluginSet;

	/// Authorization in flight, if the session awaits a callback.
	fn pending_authorization(&self) -> Option<PendingAuthorization>;

	/// Resumes an authorization issued by another provider instance.
	fn resume_authorization(&mut self, pending: PendingAuthorization) -> Result<()>;
}

/// Providers that can be built by value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
	/// LinkedIn OAuth 2.0.
	#[serde(rename = "linkedin")]
	LinkedIn,
}
impl ProviderKind {
	/// Returns the canonical provider label.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProviderKind::LinkedIn => "linkedin",
		}
	}

	/// Builds a provider for this kind.
	pub fn build(
		self,
		config: OAuthConfig,
		transport: Arc<dyn HttpTransport>,
		registry: &PluginRegistry,
	) -> Result<Box<dyn AuthProvider>> {
		match self {
			ProviderKind::LinkedIn =>
				Ok(Box::new(LinkedInProvider::new(config, transport, registry)?)),
		}
	}
}
impl Display for ProviderKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for ProviderKind {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"linkedin" => Ok(ProviderKind::LinkedIn),
			other => Err(Error::invalid_input(format!("unknown provider `{other}`"))),
		}
	}
}
