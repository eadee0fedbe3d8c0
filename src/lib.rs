//! OpenID Connect authorization-code redirect starter: discover the provider, persist the
//! pending signin, and send the user agent to the authorization endpoint.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod client;
pub mod error;
pub mod http;
pub mod id;
pub mod metadata;
pub mod navigate;
pub mod obs;
pub mod query;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::{ClientConfig, OidcClient, ReqwestOidcClient},
		http::{ReqwestHttpClient, ReqwestTransportErrorMapper},
		metadata::{MetadataService, MetadataSource, ReqwestMetadataService},
		navigate::{Navigator, RecordingNavigator},
		store::{MemoryStore, SigninStore},
	};

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a metadata service on the insecure test transport.
	pub fn build_reqwest_test_metadata_service(source: MetadataSource) -> ReqwestMetadataService {
		MetadataService::with_http_client(
			source,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}

	/// Constructs an [`OidcClient`] backed by an in-memory store, a recording navigator, and
	/// the reqwest transport used across integration tests.
	pub fn build_reqwest_test_client(
		config: ClientConfig,
	) -> (ReqwestOidcClient, Arc<MemoryStore>, Arc<RecordingNavigator>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn SigninStore> = store_backend.clone();
		let navigator_backend = Arc::new(RecordingNavigator::default());
		let navigator: Arc<dyn Navigator> = navigator_backend.clone();
		let client = OidcClient::with_http_client(
			config,
			navigator,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
		.with_store(store);

		(client, store_backend, navigator_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::{Arc, OnceLock},
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
