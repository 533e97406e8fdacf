//! Walks through a LinkedIn sign-in from the terminal with the default reqwest transport.
//!
//! 1. Export `LINKEDIN_CLIENT_ID` and `LINKEDIN_CLIENT_SECRET`.
//! 2. Open the printed authorization URL and approve the request.
//! 3. Paste the full URL LinkedIn redirected to; the demo verifies it, prints the profile and
//!    the first connections, then prints the grant blob a host application would persist.

// std
use std::{env, io, sync::Arc};
// crates.io
use color_eyre::{Result, eyre::eyre};
// self
use social_auth::{
	auth::{CallbackParams, Permission, ProviderId},
	config::OAuthConfig,
	http::ReqwestHttpClient,
	plugin::PluginRegistry,
	provider::{AuthProvider, ProviderKind},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = OAuthConfig::builder(
		ProviderId::new("linkedin")?,
		env::var("LINKEDIN_CLIENT_ID")?,
		env::var("LINKEDIN_CLIENT_SECRET")?,
	)
	.build()?;
	let transport = Arc::new(ReqwestHttpClient::new()?);
	let mut provider =
		ProviderKind::LinkedIn.build(config, transport, &PluginRegistry::default())?;
	let return_url = Url::parse("https://localhost:8443/auth/linkedin/callback")?;

	provider.set_permission(Permission::AuthenticateOnly);

	println!("Open this URL to sign in:\n{}", provider.login_redirect_url(&return_url)?);
	println!("Paste the URL you were redirected to:");

	let mut line = String::new();

	io::stdin().read_line(&mut line)?;

	let redirected = Url::parse(line.trim())?;
	let profile = provider.verify_response(&CallbackParams::from_redirect(&redirected)).await?;

	println!(
		"Signed in as {} {} ({}).",
		profile.first_name.as_deref().unwrap_or_default(),
		profile.last_name.as_deref().unwrap_or_default(),
		profile.id
	);

	match provider.contact_list().await {
		Ok(contacts) =>
			for contact in contacts.iter().take(5) {
				println!("Connection: {} {:?}.", contact.id, contact.first_name);
			},
		Err(e) => println!("Connections are unavailable with this permission: {e}."),
	}

	let grant = provider.access_grant().ok_or_else(|| eyre!("grant should be stored"))?;

	println!("Persist this grant to resume the session: {}.", grant.to_json()?);

	Ok(())
}
