//! Client-level error types shared across discovery, storage, and signin orchestration.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Clones share their sources; a failed discovery fetch is handed to every caller waiting on it.
#[derive(Clone, Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Discovery document could not be fetched or lacks a required property.
	#[error(transparent)]
	Discovery(#[from] DiscoveryError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Configuration and validation failures.
#[derive(Clone, Debug, ThisError)]
pub enum ConfigError {
	/// Neither an authority nor an explicit metadata URL resolves to a discovery URL.
	#[error("No authority or metadata URL configured.")]
	MissingMetadataUrl,
	/// The client identifier is empty.
	#[error("Client configuration is missing a client_id.")]
	MissingClientId,
	/// The client configuration payload could not be parsed.
	#[error("Client configuration is malformed.")]
	InvalidConfig {
		/// Structured parsing failure.
		#[source]
		source: Arc<serde_path_to_error::Error<serde_json::Error>>,
	},
	/// The resolved discovery URL cannot be parsed.
	#[error("Metadata URL `{url}` is invalid.")]
	InvalidMetadataUrl {
		/// URL that failed to parse.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The discovered authorization endpoint cannot be parsed.
	#[error("Authorization endpoint `{url}` is invalid.")]
	InvalidAuthorizationEndpoint {
		/// URL that failed to parse.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: SharedError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(Arc<oauth2::http::Error>),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Arc::new(src) }
	}
}
impl From<oauth2::http::Error> for ConfigError {
	fn from(e: oauth2::http::Error) -> Self {
		Self::HttpRequest(Arc::new(e))
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures raised while resolving the provider's discovery document.
#[derive(Clone, Debug, ThisError)]
pub enum DiscoveryError {
	/// The discovery endpoint answered with a non-success status.
	#[error("Could not fetch metadata: {status}.")]
	Fetch {
		/// HTTP status code returned by the discovery endpoint.
		status: u16,
	},
	/// The discovery endpoint answered with a body that is not a JSON object.
	#[error("Discovery endpoint returned malformed JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: Arc<serde_path_to_error::Error<serde_json::Error>>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// A required property is absent from the discovery document.
	#[error("Metadata does not contain property {name}.")]
	MissingProperty {
		/// Property name that was looked up.
		name: String,
	},
	/// A property is present but is not a string.
	#[error("Metadata property {name} is not a string.")]
	InvalidProperty {
		/// Property name that was looked up.
		name: String,
	},
}

/// Transport-level failures (network, IO).
#[derive(Clone, Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the discovery endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: SharedError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the discovery endpoint.")]
	Io(#[source] Arc<std::io::Error>),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Arc::new(src) }
	}
}
impl From<std::io::Error> for TransportError {
	fn from(e: std::io::Error) -> Self {
		Self::Io(Arc::new(e))
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn discovery_errors_render_status_and_property() {
		let fetch: Error = DiscoveryError::Fetch { status: 503 }.into();

		assert!(matches!(fetch, Error::Discovery(DiscoveryError::Fetch { status: 503 })));
		assert_eq!(fetch.to_string(), "Could not fetch metadata: 503.");

		let missing: Error = DiscoveryError::MissingProperty { name: "issuer".into() }.into();

		assert_eq!(missing.to_string(), "Metadata does not contain property issuer.");
	}

	#[test]
	fn missing_metadata_url_is_a_config_error() {
		let err: Error = ConfigError::MissingMetadataUrl.into();

		assert!(matches!(err, Error::Config(ConfigError::MissingMetadataUrl)));
		assert_eq!(err.to_string(), "No authority or metadata URL configured.");
	}
}
