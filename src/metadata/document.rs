//! Opaque OIDC discovery document.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, error::DiscoveryError};

/// Discovery document keyed by OIDC property name (`issuer`, `authorization_endpoint`, ...).
///
/// Only string-valued properties are exposed through [`DiscoveryDocument::property`]; the raw
/// JSON stays reachable through [`DiscoveryDocument::get`] for capability lists and flags.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscoveryDocument(Map<String, Value>);
impl DiscoveryDocument {
	/// Parses a discovery response body; anything but a JSON object is rejected.
	pub fn from_slice(body: &[u8], status: u16) -> Result<Self, DiscoveryError> {
		let mut deserializer = serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| DiscoveryError::Parse { source: Arc::new(source), status })
	}

	/// Looks up a string property; `null` counts as absent.
	pub fn property(&self, name: &str) -> Result<Option<&str>, DiscoveryError> {
		match self.0.get(name) {
			None | Some(Value::Null) => Ok(None),
			Some(Value::String(value)) => Ok(Some(value)),
			Some(_) => Err(DiscoveryError::InvalidProperty { name: name.to_owned() }),
		}
	}

	/// Returns the raw JSON value stored under `name`.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.0.get(name)
	}

	/// Inserts or replaces a property, returning the previous value.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
		self.0.insert(name.into(), value.into())
	}

	/// Number of top-level properties.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether the document has no properties.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl<K, V> FromIterator<(K, V)> for DiscoveryDocument
where
	K: Into<String>,
	V: Into<Value>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}
