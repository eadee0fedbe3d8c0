#![cfg(all(feature = "test", feature = "reqwest"))]

// std
use std::{
	env, fs,
	time::{SystemTime, UNIX_EPOCH},
};
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use oidc_redirect::{
	_preludet::*,
	client::{ClientConfig, OidcClient, SigninOptions, SigninState},
	error::DiscoveryError,
	http::ReqwestTransportErrorMapper,
	metadata::DiscoveryDocument,
	navigate::{Navigator, RecordingNavigator},
	store::{FileStore, PENDING_SIGNIN_KEY_PREFIX, SigninStore},
};

fn inline_config() -> ClientConfig {
	ClientConfig::builder("abc")
		.redirect_uri("https://app/cb")
		.scope("openid profile")
		.metadata(DiscoveryDocument::from_iter([("authorization_endpoint", "https://idp/auth")]))
		.build()
		.expect("Inline config fixture should build.")
}

fn query_pairs(url: &Url) -> HashMap<String, String> {
	url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect()
}

#[tokio::test]
async fn signin_redirect_stores_state_and_navigates() {
	let (client, store, navigator) = build_reqwest_test_client(inline_config());

	client.signin_redirect(SigninOptions::default()).await.expect("Signin should start.");

	let visited = navigator.visited();

	assert_eq!(visited.len(), 1);

	let url = &visited[0];

	assert!(url.as_str().starts_with("https://idp/auth?"));
	assert!(url.as_str().contains("scope=openid%20profile"));
	assert!(url.as_str().contains("redirect_uri=https%3A%2F%2Fapp%2Fcb"));

	let pairs = query_pairs(url);
	let mut names = pairs.keys().map(String::as_str).collect::<Vec<_>>();

	names.sort_unstable();

	assert_eq!(names, ["client_id", "redirect_uri", "response_type", "scope", "state"]);
	assert_eq!(pairs["client_id"], "abc");
	assert_eq!(pairs["redirect_uri"], "https://app/cb");
	assert_eq!(pairs["scope"], "openid profile");
	assert_eq!(pairs["response_type"], "code");

	let state = &pairs["state"];
	let key = format!("{PENDING_SIGNIN_KEY_PREFIX}{state}");

	assert_eq!(store.keys(), vec![key.clone()]);

	let payload = store
		.get_item(&key)
		.await
		.expect("Store read should succeed.")
		.expect("Pending signin should be stored.");
	let record = SigninState::from_json(&payload).expect("Stored record should parse.");

	assert_eq!(&*record.id, state);
	assert_eq!(&*record.state, state);
	assert_eq!(record.client_id, "abc");
	assert_eq!(record.scope, "openid profile");
	assert_eq!(record.redirect_uri.as_deref(), Some("https://app/cb"));
}

#[tokio::test]
async fn options_flow_into_the_url_and_record() {
	let config = ClientConfig::builder("abc")
		.redirect_uri("https://app/cb")
		.prompt("consent")
		.extra_query_param("audience", "api")
		.extra_token_param("resource", "https://api")
		.metadata(DiscoveryDocument::from_iter([(
			"authorization_endpoint",
			"https://idp/auth?tenant=t1",
		)]))
		.build()
		.expect("Config fixture should build.");
	let (client, store, navigator) = build_reqwest_test_client(config);
	let options = SigninOptions::default()
		.with_prompt("login")
		.with_max_age(0)
		.with_login_hint("ada@example.com")
		.with_response_mode("query")
		.with_request_type("si:r")
		.with_skip_user_info(true);

	client.signin_redirect(options).await.expect("Signin should start.");

	let url = navigator.last().expect("Navigator should have been invoked.");
	let pairs = query_pairs(&url);

	assert!(url.as_str().starts_with("https://idp/auth?tenant=t1&client_id=abc&"));
	assert_eq!(pairs["prompt"], "login");
	assert_eq!(pairs["login_hint"], "ada@example.com");
	assert_eq!(pairs["audience"], "api");
	assert_eq!(pairs["response_mode"], "query");
	assert!(!pairs.contains_key("max_age"));
	assert!(!pairs.contains_key("request_type"));

	let key = store.keys().pop().expect("One pending signin should be stored.");
	let payload = store.get_item(&key).await.expect("Read should succeed.").expect("Entry exists.");
	let record = SigninState::from_json(&payload).expect("Stored record should parse.");

	assert_eq!(record.response_mode.as_deref(), Some("query"));
	assert_eq!(record.request_type.as_deref(), Some("si:r"));
	assert!(record.skip_user_info);
	assert_eq!(record.extra_token_params.get("resource").map(String::as_str), Some("https://api"));
	assert_eq!(client.config.prompt.as_deref(), Some("consent"));
}

#[tokio::test]
async fn navigated_url_is_the_normalized_endpoint() {
	let config = ClientConfig::builder("abc")
		.metadata(DiscoveryDocument::from_iter([(
			"authorization_endpoint",
			"https://IDP:443/a/../auth",
		)]))
		.build()
		.expect("Config fixture should build.");
	let (client, _store, navigator) = build_reqwest_test_client(config);

	client.signin_redirect(SigninOptions::default()).await.expect("Signin should start.");

	let url = navigator.last().expect("Navigator should have been invoked.");

	assert!(url.as_str().starts_with("https://idp/auth?client_id=abc&scope=openid&"));
	assert_eq!(url.host_str(), Some("idp"));
	assert_eq!(url.port(), None);
}

#[tokio::test]
async fn discovery_is_shared_across_signins() {
	let server = MockServer::start_async().await;
	let discovery = server
		.mock_async(|when, then| {
			when.method(GET).path("/.well-known/openid-configuration");
			then.status(200).header("content-type", "application/json").body(
				json!({
					"issuer": server.base_url(),
					"authorization_endpoint": server.url("/authorize"),
				})
				.to_string(),
			);
		})
		.await;
	let config = ClientConfig::builder("abc")
		.authority(server.base_url())
		.redirect_uri("https://app/cb")
		.build()
		.expect("Config fixture should build.");
	let (client, store, navigator) = build_reqwest_test_client(config);

	client.signin_redirect(SigninOptions::default()).await.expect("First signin should start.");
	client.signin_redirect(SigninOptions::default()).await.expect("Second signin should start.");

	discovery.assert_hits_async(1).await;

	let visited = navigator.visited();
	let first = query_pairs(&visited[0]);
	let second = query_pairs(&visited[1]);

	assert!(visited[0].as_str().starts_with(&format!("{}?", server.url("/authorize"))));
	assert_ne!(first["state"], second["state"]);
	assert_eq!(store.len(), 2);

	let record = SigninState::from_json(
		&store
			.get_item(&format!("{PENDING_SIGNIN_KEY_PREFIX}{}", first["state"]))
			.await
			.expect("Read should succeed.")
			.expect("First signin should be stored."),
	)
	.expect("Stored record should parse.");

	assert_eq!(record.authority.as_deref(), Some(server.base_url().as_str()));
}

#[tokio::test]
async fn discovery_failure_leaves_no_trace() {
	let server = MockServer::start_async().await;
	let _discovery = server
		.mock_async(|when, then| {
			when.method(GET).path("/.well-known/openid-configuration");
			then.status(500);
		})
		.await;
	let config = ClientConfig::builder("abc")
		.authority(server.base_url())
		.build()
		.expect("Config fixture should build.");
	let (client, store, navigator) = build_reqwest_test_client(config);
	let err = client
		.signin_redirect(SigninOptions::default())
		.await
		.expect_err("A failing discovery request should abort the signin.");

	assert!(matches!(err, Error::Discovery(DiscoveryError::Fetch { status: 500 })));
	assert!(store.is_empty());
	assert!(navigator.visited().is_empty());
}

#[tokio::test]
async fn missing_authorization_endpoint_aborts_before_storage() {
	let config = ClientConfig::builder("abc")
		.metadata(DiscoveryDocument::from_iter([("issuer", "https://idp")]))
		.build()
		.expect("Config fixture should build.");
	let (client, store, navigator) = build_reqwest_test_client(config);
	let err = client
		.signin_redirect(SigninOptions::default())
		.await
		.expect_err("Signin without an authorization endpoint should fail.");

	assert!(matches!(
		err,
		Error::Discovery(DiscoveryError::MissingProperty { ref name }) if name == "authorization_endpoint"
	));
	assert!(store.is_empty());
	assert!(navigator.last().is_none());
}

#[tokio::test]
async fn file_store_keeps_pending_signins_across_reopen() {
	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("Clock should be after the epoch.")
		.as_nanos();
	let path = env::temp_dir().join(format!("oidc-redirect-it-{nanos}")).join("pending.json");
	let store = Arc::new(FileStore::open(&path).expect("File store should open."));
	let navigator = Arc::new(RecordingNavigator::default());
	let client: OidcClient<_, ReqwestTransportErrorMapper> = OidcClient::with_http_client(
		inline_config(),
		navigator.clone() as Arc<dyn Navigator>,
		test_reqwest_http_client(),
		Arc::new(ReqwestTransportErrorMapper),
	)
	.with_store(store.clone() as Arc<dyn SigninStore>);

	client.signin_redirect(SigninOptions::default()).await.expect("Signin should start.");

	let url = navigator.last().expect("Navigator should have been invoked.");
	let state = query_pairs(&url).remove("state").expect("State should be present.");
	let key = format!("{PENDING_SIGNIN_KEY_PREFIX}{state}");
	let reopened = FileStore::open(&path).expect("File store should reopen.");
	let payload = reopened
		.get_item(&key)
		.await
		.expect("Read should succeed.")
		.expect("Pending signin should survive a reopen.");

	assert_eq!(
		SigninState::from_json(&payload).expect("Stored record should parse.").state.to_string(),
		state
	);

	if let Some(dir) = path.parent() {
		let _ = fs::remove_dir_all(dir);
	}
}
