//! Twitter home-timeline feed plugin.

// self
use crate::{
	_prelude::*,
	auth::PluginId,
	config,
	model::Feed,
	normalize,
	obs::{self, OperationKind},
	plugin::{FeedPlugin, PluginDescriptor, PluginInstance},
	strategy::{ApiCall, OperationFuture, ProviderSupport},
};

/// Identifier of the home-timeline feed plugin.
pub const FEED_PLUGIN_ID: &str = "twitter.feed";
/// Home timeline endpoint.
pub const FEED_URL: &str = "https://api.twitter.com/1.1/statuses/home_timeline.json";

/// Descriptor for [`TwitterFeedPlugin`].
pub fn feed_descriptor() -> PluginDescriptor {
	PluginDescriptor::new(PluginId::from_static(FEED_PLUGIN_ID), |support| {
		PluginInstance::Feed(Arc::new(TwitterFeedPlugin::new(support)))
	})
}

/// Reads up to twenty statuses from the home timeline.
#[derive(Clone, Debug)]
pub struct TwitterFeedPlugin {
	support: ProviderSupport,
}
impl TwitterFeedPlugin {
	/// Binds the plugin to a provider.
	pub fn new(support: ProviderSupport) -> Self {
		Self { support }
	}
}
impl FeedPlugin for TwitterFeedPlugin {
	fn feeds(&self) -> OperationFuture<'_, Vec<Feed>> {
		Box::pin(obs::observe(OperationKind::Feed, "twitter.feed", async move {
			let url = config::parse_endpoint("feed", FEED_URL)?;
			let response = self.support.fetch(ApiCall::get(url.clone())).await?;
			let feeds = normalize::decode(&url, &response, normalize::twitter::home_timeline)?;

			tracing::debug!(count = feeds.len(), "Fetched Twitter home timeline.");

			Ok(feeds)
		}))
	}
}
