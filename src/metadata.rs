//! OIDC discovery: metadata URL resolution, lazy document fetching, and endpoint accessors.
//!
//! [`MetadataService`] resolves the discovery URL from an explicit `metadata_url` or from the
//! authority (`{authority}/.well-known/openid-configuration`), fetches the document once, and
//! serves it from a [`MetadataCache`] for the lifetime of the service.

pub mod cache;
pub mod document;

pub use cache::*;
pub use document::*;

// crates.io
use oauth2::{
	AsyncHttpClient,
	http::{Method, Request, header::ACCEPT},
};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, DiscoveryError},
	http::{DiscoveryHttpClient, ResponseMetadataSlot, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};
#[cfg(feature = "reqwest")]
use crate::http::{ReqwestHttpClient, ReqwestTransportErrorMapper};

/// Path appended to an authority to reach its discovery document.
pub const OIDC_METADATA_URL_PATH: &str = ".well-known/openid-configuration";

#[cfg(feature = "reqwest")]
/// Metadata service specialized for the crate's default reqwest transport stack.
pub type ReqwestMetadataService = MetadataService<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Where the discovery document comes from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetadataSource {
	/// Base URL of the OIDC provider.
	pub authority: Option<String>,
	/// Explicit discovery URL; wins over `authority`.
	pub metadata_url: Option<String>,
	/// Pre-supplied discovery document; no request is ever made when present.
	pub metadata: Option<DiscoveryDocument>,
}
impl MetadataSource {
	/// Source that derives the discovery URL from the authority.
	pub fn authority(authority: impl Into<String>) -> Self {
		Self { authority: Some(authority.into()), ..Default::default() }
	}

	/// Source that fetches from an explicit discovery URL.
	pub fn metadata_url(url: impl Into<String>) -> Self {
		Self { metadata_url: Some(url.into()), ..Default::default() }
	}

	/// Source backed by an inline discovery document.
	pub fn document(document: DiscoveryDocument) -> Self {
		Self { metadata: Some(document), ..Default::default() }
	}
}

/// Lazily fetches and caches a provider's discovery document.
pub struct MetadataService<C, M>
where
	C: ?Sized + DiscoveryHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client used for the discovery request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	authority: Option<String>,
	metadata_url: Option<String>,
	resolved_url: OnceLock<Option<String>>,
	cache: MetadataCache,
}
impl<C, M> MetadataService<C, M>
where
	C: ?Sized + DiscoveryHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a service that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		source: MetadataSource,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		let MetadataSource { authority, metadata_url, metadata } = source;
		let cache = metadata.map(MetadataCache::ready).unwrap_or_default();

		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			authority: authority.filter(|value| !value.is_empty()),
			metadata_url: metadata_url.filter(|value| !value.is_empty()),
			resolved_url: OnceLock::new(),
			cache,
		}
	}

	/// Configured authority, if any.
	pub fn authority(&self) -> Option<&str> {
		self.authority.as_deref()
	}

	/// Current state of the discovery cache.
	pub fn cache_status(&self) -> CacheStatus {
		self.cache.status()
	}

	/// Resolves the discovery URL, computing it at most once.
	///
	/// An explicit metadata URL is returned unchanged. Otherwise the authority is used,
	/// with exactly one `/` and [`OIDC_METADATA_URL_PATH`] appended unless it already
	/// contains that path.
	pub fn resolve_metadata_url(&self) -> Option<&str> {
		self.resolved_url
			.get_or_init(|| {
				self.metadata_url.clone().or_else(|| self.authority.as_deref().map(derive_metadata_url))
			})
			.as_deref()
	}

	/// Returns the discovery document, fetching it on first use.
	pub async fn get_metadata(&self) -> Result<Arc<DiscoveryDocument>> {
		const KIND: FlowKind = FlowKind::Discovery;

		if let Some(document) = self.cache.get() {
			return Ok(document);
		}

		let span = FlowSpan::new(KIND, "get_metadata");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let url = self.resolve_metadata_url().ok_or(ConfigError::MissingMetadataUrl)?;

				self.cache.get_or_fetch(|| self.fetch_document(url)).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Looks up a string property; absent properties fail unless `optional` is set.
	pub async fn metadata_property(&self, name: &str, optional: bool) -> Result<Option<String>> {
		let document = self.get_metadata().await?;

		match document.property(name)? {
			Some(value) => Ok(Some(value.to_owned())),
			None if optional => Ok(None),
			None => Err(DiscoveryError::MissingProperty { name: name.to_owned() }.into()),
		}
	}

	/// The provider's `issuer` (required).
	pub async fn issuer(&self) -> Result<String> {
		self.required_property("issuer").await
	}

	/// The provider's `authorization_endpoint` (required).
	pub async fn authorization_endpoint(&self) -> Result<String> {
		self.required_property("authorization_endpoint").await
	}

	/// The provider's `userinfo_endpoint` (required).
	pub async fn userinfo_endpoint(&self) -> Result<String> {
		self.required_property("userinfo_endpoint").await
	}

	/// The provider's `token_endpoint`; optional unless requested through
	/// [`MetadataService::required_token_endpoint`].
	pub async fn token_endpoint(&self) -> Result<Option<String>> {
		self.metadata_property("token_endpoint", true).await
	}

	/// The provider's `token_endpoint`, failing when absent.
	pub async fn required_token_endpoint(&self) -> Result<String> {
		self.required_property("token_endpoint").await
	}

	/// The provider's `check_session_iframe` (optional).
	pub async fn check_session_iframe(&self) -> Result<Option<String>> {
		self.metadata_property("check_session_iframe", true).await
	}

	/// The provider's `end_session_endpoint` (optional).
	pub async fn end_session_endpoint(&self) -> Result<Option<String>> {
		self.metadata_property("end_session_endpoint", true).await
	}

	/// The provider's `revocation_endpoint` (optional).
	pub async fn revocation_endpoint(&self) -> Result<Option<String>> {
		self.metadata_property("revocation_endpoint", true).await
	}

	/// The provider's `jwks_uri` (optional).
	pub async fn jwks_uri(&self) -> Result<Option<String>> {
		self.metadata_property("jwks_uri", true).await
	}

	async fn required_property(&self, name: &str) -> Result<String> {
		self.metadata_property(name, false)
			.await?
			.ok_or_else(|| DiscoveryError::MissingProperty { name: name.to_owned() }.into())
	}

	async fn fetch_document(&self, url: &str) -> Result<DiscoveryDocument> {
		let parsed = Url::parse(url)
			.map_err(|source| ConfigError::InvalidMetadataUrl { url: url.to_owned(), source })?;
		let request = Request::builder()
			.method(Method::GET)
			.uri(parsed.as_str())
			.header(ACCEPT, "application/json")
			.body(Vec::new())
			.map_err(ConfigError::from)?;
		let meta = ResponseMetadataSlot::default();
		let handle = self.http_client.with_metadata(meta.clone());
		let response = handle
			.call(request)
			.await
			.map_err(|e| self.transport_mapper.map_transport_error(meta.take().as_ref(), e))?;
		let status = response.status();

		if !status.is_success() {
			return Err(DiscoveryError::Fetch { status: status.as_u16() }.into());
		}

		Ok(DiscoveryDocument::from_slice(response.body(), status.as_u16())?)
	}
}
#[cfg(feature = "reqwest")]
impl MetadataService<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a service backed by its own reqwest transport.
	pub fn new(source: MetadataSource) -> Self {
		Self::with_http_client(
			source,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Debug for MetadataService<C, M>
where
	C: ?Sized + DiscoveryHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MetadataService")
			.field("authority", &self.authority)
			.field("metadata_url", &self.metadata_url)
			.field("cache_status", &self.cache.status())
			.finish()
	}
}

fn derive_metadata_url(authority: &str) -> String {
	if authority.contains(OIDC_METADATA_URL_PATH) {
		return authority.to_owned();
	}

	let mut url = authority.to_owned();

	if !url.ends_with('/') {
		url.push('/');
	}

	url.push_str(OIDC_METADATA_URL_PATH);

	url
}
