//! Storage contracts and built-in key-value backends for pending signin records.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, id::CorrelationId};

/// Namespace prefix of every pending-signin storage key.
pub const PENDING_SIGNIN_KEY_PREFIX: &str = "oidc-client:";

/// Boxed future returned by [`SigninStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// String key-value storage modeled after the Web Storage API.
///
/// The signin flow only writes; reads and removals belong to whatever completes the signin
/// after the provider redirects back.
pub trait SigninStore
where
	Self: Send + Sync,
{
	/// Stores `value` under `key`, replacing any previous value.
	fn set_item<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, ()>;

	/// Returns the value stored under `key`, if present.
	fn get_item<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

	/// Removes and returns the value stored under `key`, if present.
	fn remove_item<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;
}

/// Error type produced by [`SigninStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend or by the record encoder.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Builds the storage key (`oidc-client:<id>`) of a pending signin.
pub fn pending_signin_key(id: &CorrelationId) -> String {
	format!("{PENDING_SIGNIN_KEY_PREFIX}{id}")
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_crate_error_with_source() {
		let store_error = StoreError::Backend { message: "quota exceeded".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("quota exceeded"));

		let source = StdError::source(&error)
			.expect("Crate error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn pending_signin_key_is_namespaced() {
		let id = CorrelationId::new("abc123").expect("Identifier fixture should be valid.");

		assert_eq!(pending_signin_key(&id), "oidc-client:abc123");
	}
}
