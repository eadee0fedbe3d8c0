//! Thread-safe in-memory [`SigninStore`], the default backend.

// self
use crate::{
	_prelude::*,
	store::{SigninStore, StoreError, StoreFuture},
};

type StoreMap = Arc<RwLock<BTreeMap<String, String>>>;

/// Process-local storage backend; clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Snapshot of every stored key in lexical order.
	pub fn keys(&self) -> Vec<String> {
		self.0.read().keys().cloned().collect()
	}

	/// Number of stored entries.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Whether the store holds no entries.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn set_now(map: &StoreMap, key: &str, value: String) -> Result<(), StoreError> {
		map.write().insert(key.to_owned(), value);

		Ok(())
	}
}
impl SigninStore for MemoryStore {
	fn set_item<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, ()> {
		Box::pin(async move { Self::set_now(&self.0, key, value) })
	}

	fn get_item<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
		Box::pin(async move { Ok(self.0.read().get(key).cloned()) })
	}

	fn remove_item<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
		Box::pin(async move { Ok(self.0.write().remove(key)) })
	}
}
