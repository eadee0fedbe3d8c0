//! Demonstrates starting an authorization-code signin against a mocked provider: discovery is
//! fetched once, the pending signin lands in the in-memory store, and the redirect URL is
//! captured by a recording navigator instead of a browser.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use oidc_redirect::{
	client::{ClientConfig, ReqwestOidcClient, SigninOptions},
	navigate::{Navigator, RecordingNavigator},
	store::{MemoryStore, SigninStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let discovery_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/.well-known/openid-configuration");
			then.status(200).header("content-type", "application/json").body(format!(
				"{{\"issuer\":\"{}\",\"authorization_endpoint\":\"{}\"}}",
				server.base_url(),
				server.url("/authorize"),
			));
		})
		.await;
	let config = ClientConfig::builder("demo-client")
		.authority(server.base_url())
		.redirect_uri("https://app.example.com/callback")
		.scope("openid profile email")
		.build()?;
	let store = Arc::new(MemoryStore::default());
	let navigator = Arc::new(RecordingNavigator::default());
	let client = ReqwestOidcClient::new(config, navigator.clone() as Arc<dyn Navigator>)
		.with_store(store.clone() as Arc<dyn SigninStore>);

	client.signin_redirect(SigninOptions::default().with_login_hint("ada@example.com")).await?;
	client.signin_redirect(SigninOptions::default().with_prompt("login")).await?;

	for url in navigator.visited() {
		println!("Redirect: {url}");
	}
	for key in store.keys() {
		println!("Pending signin: {key}");
	}

	discovery_mock.assert_hits_async(1).await;

	Ok(())
}
