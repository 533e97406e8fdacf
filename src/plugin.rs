//! Optional per-provider capabilities layered on the authenticated-request capability.
//!
//! A [`PluginRegistry`] maps [`PluginId`]s to constructors. Providers ask the registry to
//! instantiate their [`plugins_list`](crate::provider::AuthProvider::plugins_list); each
//! plugin receives a [`ProviderSupport`] and never sees the access grant. Identifiers the
//! registry cannot resolve are recorded as [`Error::PluginUnavailable`] on the resulting
//! [`PluginSet`] without failing the provider.

pub mod linkedin;
pub mod twitter;

// self
use crate::{
	_prelude::*,
	auth::PluginId,
	model::{Career, Feed},
	strategy::{OperationFuture, ProviderSupport},
};

/// Capability producing a bounded sequence of feed entries.
pub trait FeedPlugin: Send + Sync {
	/// Fetches the latest feed entries.
	fn feeds(&self) -> OperationFuture<'_, Vec<Feed>>;
}

/// Capability producing the user's professional history.
pub trait CareerPlugin: Send + Sync {
	/// Fetches career details.
	fn career_details(&self) -> OperationFuture<'_, Career>;
}

/// Instantiated plugin, tagged by capability.
#[derive(Clone)]
pub enum PluginInstance {
	/// Feed capability.
	Feed(Arc<dyn FeedPlugin>),
	/// Career capability.
	Career(Arc<dyn CareerPlugin>),
}
impl PluginInstance {
	/// Returns a stable capability label.
	pub const fn capability(&self) -> &'static str {
		match self {
			PluginInstance::Feed(_) => "feed",
			PluginInstance::Career(_) => "career",
		}
	}
}
impl Debug for PluginInstance {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("PluginInstance").field(&self.capability()).finish()
	}
}

/// Constructor stored in the registry.
pub type PluginConstructor = fn(ProviderSupport) -> PluginInstance;

/// Registry entry describing how to build a plugin.
#[derive(Clone)]
pub struct PluginDescriptor {
	/// Identifier the plugin is resolved by.
	pub id: PluginId,
	/// Scope tokens the plugin needs beyond the provider's base set.
	pub scopes: Vec<String>,
	/// Builds an instance bound to a provider.
	pub constructor: PluginConstructor,
}
impl PluginDescriptor {
	/// Creates a descriptor that requests no extra scopes.
	pub fn new(id: PluginId, constructor: PluginConstructor) -> Self {
		Self { id, scopes: Vec::new(), constructor }
	}

	/// Adds scope tokens requested by the plugin.
	pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes.extend(scopes.into_iter().map(Into::into));

		self
	}
}
impl Debug for PluginDescriptor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PluginDescriptor")
			.field("id", &self.id)
			.field("scopes", &self.scopes)
			.finish_non_exhaustive()
	}
}

/// Constructors keyed by plugin identifier.
#[derive(Clone, Debug)]
pub struct PluginRegistry {
	descriptors: BTreeMap<PluginId, PluginDescriptor>,
}
impl PluginRegistry {
	/// Creates a registry without any plugin.
	pub fn empty() -> Self {
		Self { descriptors: BTreeMap::new() }
	}

	/// Registers a descriptor, returning the one it replaced.
	pub fn register(&mut self, descriptor: PluginDescriptor) -> Option<PluginDescriptor> {
		self.descriptors.insert(descriptor.id.clone(), descriptor)
	}

	/// Looks up a descriptor.
	pub fn get(&self, id: &str) -> Option<&PluginDescriptor> {
		self.descriptors.get(id)
	}

	/// Scope tokens requested by the resolvable plugins among `ids`, in `ids` order.
	pub fn scopes_for<'a>(&'a self, ids: &'a [PluginId]) -> impl Iterator<Item = &'a str> {
		ids.iter()
			.filter_map(|id| self.get(id))
			.flat_map(|descriptor| descriptor.scopes.iter().map(String::as_str))
	}

	/// Builds every plugin in `ids`, isolating the ones that cannot be resolved.
	pub fn instantiate(&self, ids: &[PluginId], support: &ProviderSupport) -> PluginSet {
		let mut set = PluginSet::default();

		for id in ids {
			match self.get(id) {
				Some(descriptor) => {
					set.loaded.push((id.clone(), (descriptor.constructor)(support.clone())));
				},
				None => {
					tracing::warn!(plugin = %id, "Plugin is not registered.");

					set.unavailable.push(Error::PluginUnavailable {
						plugin: id.to_string(),
						reason: "no constructor is registered under this identifier".into(),
					});
				},
			}
		}

		set
	}
}
impl Default for PluginRegistry {
	fn default() -> Self {
		let mut registry = Self::empty();

		for descriptor in [
			linkedin::feed_descriptor(),
			linkedin::career_descriptor(),
			twitter::feed_descriptor(),
		] {
			registry.register(descriptor);
		}

		registry
	}
}

/// Plugins instantiated for one provider.
#[derive(Debug, Default)]
pub struct PluginSet {
	loaded: Vec<(PluginId, PluginInstance)>,
	unavailable: Vec<Error>,
}
impl PluginSet {
	/// Returns the plugin registered under `id`.
	pub fn get(&self, id: &str) -> Option<&PluginInstance> {
		self.loaded.iter().find(|(loaded, _)| &**loaded == id).map(|(_, instance)| instance)
	}

	/// Returns the first feed plugin.
	pub fn feed(&self) -> Option<Arc<dyn FeedPlugin>> {
		self.loaded.iter().find_map(|(_, instance)| match instance {
			PluginInstance::Feed(plugin) => Some(plugin.clone()),
			PluginInstance::Career(_) => None,
		})
	}

	/// Returns the first career plugin.
	pub fn career(&self) -> Option<Arc<dyn CareerPlugin>> {
		self.loaded.iter().find_map(|(_, instance)| match instance {
			PluginInstance::Career(plugin) => Some(plugin.clone()),
			PluginInstance::Feed(_) => None,
		})
	}

	/// Identifiers of the loaded plugins, in load order.
	pub fn ids(&self) -> impl Iterator<Item = &PluginId> {
		self.loaded.iter().map(|(id, _)| id)
	}

	/// [`Error::PluginUnavailable`] entries for identifiers that could not be resolved.
	pub fn failures(&self) -> &[Error] {
		&self.unavailable
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::{AccessGrant, CallbackParams},
		http::ApiResponse,
		strategy::{ApiCall, AuthenticationStrategy, AuthorizationRequest},
	};

	struct NoopStrategy;
	impl AuthenticationStrategy for NoopStrategy {
		fn build_authorization_url(&self, request: &AuthorizationRequest) -> Result<Url> {
			Ok(request.return_url.clone())
		}

		fn verify<'a>(
			&'a self,
			_: &'a CallbackParams,
			_: &'a Url,
		) -> OperationFuture<'a, AccessGrant> {
			Box::pin(async { Err(Error::invalid_input("unused")) })
		}

		fn execute_authenticated(&self, _: ApiCall) -> OperationFuture<'_, ApiResponse> {
			Box::pin(async { Ok(ApiResponse::new(200, "")) })
		}

		fn set_access_grant(&self, _: AccessGrant) -> Result<()> {
			Ok(())
		}

		fn access_grant(&self) -> Option<AccessGrant> {
			None
		}

		fn logout(&self) {}
	}

	fn id(raw: &str) -> PluginId {
		PluginId::new(raw).expect("Plugin fixture should be valid.")
	}

	#[test]
	fn unknown_plugins_are_isolated() {
		let registry = PluginRegistry::default();
		let support = ProviderSupport::new(Arc::new(NoopStrategy));
		let set = registry.instantiate(
			&[id(linkedin::FEED_PLUGIN_ID), id("acme.photos"), id(linkedin::CAREER_PLUGIN_ID)],
			&support,
		);

		assert_eq!(
			set.ids().map(|id| id.as_ref()).collect::<Vec<_>>(),
			[linkedin::FEED_PLUGIN_ID, linkedin::CAREER_PLUGIN_ID]
		);
		assert!(set.feed().is_some());
		assert!(set.career().is_some());
		assert!(matches!(set.get(linkedin::CAREER_PLUGIN_ID), Some(PluginInstance::Career(_))));
		assert_eq!(set.failures().len(), 1);
		assert!(matches!(
			&set.failures()[0],
			Error::PluginUnavailable { plugin, .. } if plugin == "acme.photos"
		));
	}

	#[test]
	fn registered_scopes_follow_requested_order() {
		let mut registry = PluginRegistry::empty();

		registry.register(
			PluginDescriptor::new(id("acme.photos"), twitter::feed_descriptor().constructor)
				.with_scopes(["r_photos"]),
		);
		registry.register(
			PluginDescriptor::new(id("acme.jobs"), linkedin::career_descriptor().constructor)
				.with_scopes(["r_jobs", "r_basic"]),
		);

		let ids = [id("acme.jobs"), id("missing"), id("acme.photos")];

		assert_eq!(registry.scopes_for(&ids).collect::<Vec<_>>(), ["r_jobs", "r_basic", "r_photos"]);
	}
}
