// self
use crate::{
	_prelude::*,
	auth::{PluginId, ProviderId, TokenSecret},
	config::OAuthConfig,
	error::ConfigError,
};

/// Builder for [`OAuthConfig`] values.
#[derive(Debug)]
pub struct OAuthConfigBuilder {
	config: OAuthConfig,
}
impl OAuthConfigBuilder {
	/// Creates a new builder seeded with the provider identifier and client credentials.
	pub fn new(
		id: ProviderId,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		Self {
			config: OAuthConfig {
				id,
				client_id: client_id.into(),
				client_secret: TokenSecret::new(client_secret),
				authorization_url: None,
				access_token_url: None,
				custom_permissions: None,
				registered_plugins: Vec::new(),
				plugin_scopes: Vec::new(),
				save_raw_response: false,
			},
		}
	}

	/// Overrides the authorization endpoint.
	pub fn authorization_url(mut self, url: Url) -> Self {
		self.config.authorization_url = Some(url);

		self
	}

	/// Overrides the token endpoint.
	pub fn access_token_url(mut self, url: Url) -> Self {
		self.config.access_token_url = Some(url);

		self
	}

	/// Sets the comma-separated scope list used with custom permissions.
	pub fn custom_permissions(mut self, permissions: impl Into<String>) -> Self {
		self.config.custom_permissions = Some(permissions.into());

		self
	}

	/// Appends a caller-registered plugin identifier.
	pub fn register_plugin(mut self, plugin: PluginId) -> Self {
		self.config.registered_plugins.push(plugin);

		self
	}

	/// Appends scope tokens requested on behalf of plugins.
	pub fn plugin_scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.config.plugin_scopes.extend(scopes.into_iter().map(Into::into));

		self
	}

	/// Keeps raw provider payloads on normalized entities.
	pub fn save_raw_response(mut self, save: bool) -> Self {
		self.config.save_raw_response = save;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<OAuthConfig, ConfigError> {
		self.config.validate()?;

		Ok(self.config)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn builder() -> OAuthConfigBuilder {
		OAuthConfig::builder(
			ProviderId::new("linkedin").expect("Provider fixture should be valid."),
			"client",
			"secret",
		)
	}

	#[test]
	fn rejects_missing_credentials() {
		let err = OAuthConfig::builder(
			ProviderId::new("linkedin").expect("Provider fixture should be valid."),
			" ",
			"secret",
		)
		.build()
		.expect_err("Blank client identifiers must be rejected.");

		assert!(matches!(err, ConfigError::MissingClientId));

		let err = OAuthConfig::builder(
			ProviderId::new("linkedin").expect("Provider fixture should be valid."),
			"client",
			"",
		)
		.build()
		.expect_err("Blank client secrets must be rejected.");

		assert!(matches!(err, ConfigError::MissingClientSecret));
	}

	#[test]
	fn rejects_insecure_overrides() {
		let err = builder()
			.authorization_url(
				Url::parse("http://idp.example.com/authorize").expect("Fixture URL should parse."),
			)
			.build()
			.expect_err("Plain HTTP overrides must be rejected.");

		assert!(matches!(err, ConfigError::InsecureEndpoint { endpoint: "authorization", .. }));
	}

	#[test]
	fn rejects_blank_custom_permissions_and_bad_plugin_scopes() {
		let err = builder()
			.custom_permissions("   ")
			.build()
			.expect_err("Blank custom permissions must be rejected.");

		assert!(matches!(err, ConfigError::BlankCustomPermissions));

		let err = builder()
			.plugin_scopes(["r_basicprofile", "two words"])
			.build()
			.expect_err("Plugin scopes with whitespace must be rejected.");

		assert!(matches!(err, ConfigError::InvalidPluginScope { .. }));
	}

	#[test]
	fn collects_plugins_in_order() {
		let config = builder()
			.register_plugin(PluginId::new("twitter.feed").expect("Plugin fixture should be valid."))
			.register_plugin(PluginId::new("custom.jobs").expect("Plugin fixture should be valid."))
			.plugin_scopes(["r_jobs"])
			.save_raw_response(true)
			.build()
			.expect("Configuration should build.");

		assert_eq!(
			config.registered_plugins.iter().map(|id| id.as_ref()).collect::<Vec<_>>(),
			vec!["twitter.feed", "custom.jobs"]
		);
		assert_eq!(config.plugin_scopes, vec!["r_jobs".to_string()]);
		assert!(config.save_raw_response);
	}
}
