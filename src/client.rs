//! OIDC client facade that owns configuration, discovery, storage, and navigation.

pub mod config;
pub mod signin;
pub mod state;

pub use config::*;
pub use signin::*;
pub use state::*;

// self
use crate::{
	_prelude::*,
	http::{DiscoveryHttpClient, TransportErrorMapper},
	metadata::MetadataService,
	navigate::Navigator,
	store::{MemoryStore, SigninStore},
};
#[cfg(feature = "reqwest")]
use crate::http::{ReqwestHttpClient, ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestOidcClient = OidcClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Starts OIDC authorization-code signins against a single provider.
///
/// The client owns its [`MetadataService`], so the discovery document is fetched at most
/// once per client and shared by every signin it starts.
pub struct OidcClient<C, M>
where
	C: ?Sized + DiscoveryHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Defaults captured at construction.
	pub config: ClientConfig,
	/// Backend that receives pending signin records.
	pub store: Arc<dyn SigninStore>,
	/// Side effect that moves the user agent to the provider.
	pub navigator: Arc<dyn Navigator>,
	metadata: MetadataService<C, M>,
}
impl<C, M> OidcClient<C, M>
where
	C: ?Sized + DiscoveryHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	///
	/// Pending signins go to a fresh [`MemoryStore`] until [`OidcClient::with_store`]
	/// replaces it.
	pub fn with_http_client(
		config: ClientConfig,
		navigator: Arc<dyn Navigator>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		let metadata = MetadataService::with_http_client(config.metadata_source(), http_client, mapper);

		Self { config, store: Arc::new(MemoryStore::default()), navigator, metadata }
	}

	/// Replaces the storage backend.
	pub fn with_store(mut self, store: Arc<dyn SigninStore>) -> Self {
		self.store = store;

		self
	}

	/// Discovery service backing this client.
	pub fn metadata_service(&self) -> &MetadataService<C, M> {
		&self.metadata
	}
}
#[cfg(feature = "reqwest")]
impl OidcClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a client that provisions its own reqwest transport.
	pub fn new(config: ClientConfig, navigator: Arc<dyn Navigator>) -> Self {
		Self::with_http_client(
			config,
			navigator,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Debug for OidcClient<C, M>
where
	C: ?Sized + DiscoveryHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OidcClient")
			.field("client_id", &self.config.client_id)
			.field("client_secret_set", &self.config.client_secret.is_some())
			.field("metadata", &self.metadata)
			.finish()
	}
}

/// Per-call value when set, otherwise the configured default.
pub(crate) fn overlay<T>(option: &Option<T>, default: &Option<T>) -> Option<T>
where
	T: Clone,
{
	option.as_ref().or(default.as_ref()).cloned()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn overlay_prefers_per_call_values() {
		let set = Some("login".to_owned());
		let unset: Option<String> = None;
		let default = Some("consent".to_owned());

		assert_eq!(overlay(&set, &default), set);
		assert_eq!(overlay(&unset, &default), default);
		assert_eq!(overlay(&unset, &unset), None);
	}
}
