//! LinkedIn network-updates feed and career plugins.

// self
use crate::{
	_prelude::*,
	auth::PluginId,
	config,
	model::{Career, Feed},
	normalize,
	obs::{self, OperationKind},
	plugin::{CareerPlugin, FeedPlugin, PluginDescriptor, PluginInstance},
	strategy::{ApiCall, OperationFuture, ProviderSupport},
};

/// Identifier of the network-updates feed plugin.
pub const FEED_PLUGIN_ID: &str = "linkedin.feed";
/// Identifier of the career plugin.
pub const CAREER_PLUGIN_ID: &str = "linkedin.career";
/// Network updates limited to shares and status changes.
pub const FEED_URL: &str =
	"https://api.linkedin.com/v1/people/~/network/updates?type=SHAR&type=STAT&count=20";
/// Profile projection carrying career sections.
pub const CAREER_URL: &str = "https://api.linkedin.com/v1/people/~:(id,headline,positions,educations,recommendations-received)";

/// Descriptor for [`LinkedInFeedPlugin`].
pub fn feed_descriptor() -> PluginDescriptor {
	PluginDescriptor::new(PluginId::from_static(FEED_PLUGIN_ID), |support| {
		PluginInstance::Feed(Arc::new(LinkedInFeedPlugin::new(support)))
	})
}

/// Descriptor for [`LinkedInCareerPlugin`].
pub fn career_descriptor() -> PluginDescriptor {
	PluginDescriptor::new(PluginId::from_static(CAREER_PLUGIN_ID), |support| {
		PluginInstance::Career(Arc::new(LinkedInCareerPlugin::new(support)))
	})
}

/// Reads the member's network updates.
#[derive(Clone, Debug)]
pub struct LinkedInFeedPlugin {
	support: ProviderSupport,
}
impl LinkedInFeedPlugin {
	/// Binds the plugin to a provider.
	pub fn new(support: ProviderSupport) -> Self {
		Self { support }
	}
}
impl FeedPlugin for LinkedInFeedPlugin {
	fn feeds(&self) -> OperationFuture<'_, Vec<Feed>> {
		Box::pin(obs::observe(OperationKind::Feed, "linkedin.feed", async move {
			let url = config::parse_endpoint("feed", FEED_URL)?;
			let response = self.support.fetch(ApiCall::get(url.clone())).await?;
			let feeds = normalize::decode(&url, &response, normalize::linkedin::network_updates)?;

			tracing::debug!(count = feeds.len(), "Fetched LinkedIn network updates.");

			Ok(feeds)
		}))
	}
}

/// Reads headline, positions, educations, and received recommendations.
#[derive(Clone, Debug)]
pub struct LinkedInCareerPlugin {
	support: ProviderSupport,
}
impl LinkedInCareerPlugin {
	/// Binds the plugin to a provider.
	pub fn new(support: ProviderSupport) -> Self {
		Self { support }
	}
}
impl CareerPlugin for LinkedInCareerPlugin {
	fn career_details(&self) -> OperationFuture<'_, Career> {
		Box::pin(obs::observe(OperationKind::Career, "linkedin.career", async move {
			let url = config::parse_endpoint("career", CAREER_URL)?;
			let response = self.support.fetch(ApiCall::get(url.clone())).await?;

			normalize::decode(&url, &response, normalize::linkedin::career)
		}))
	}
}
