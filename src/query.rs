//! Query-string helpers used to fold signin request properties into the authorization URL.
//!
//! Every name and value goes through the same percent-encoding function
//! ([`urlencoding::encode`]), which leaves ASCII alphanumerics and `-_.~` untouched and escapes
//! everything else. Nested maps are flattened onto the same URL, one pair per entry.

// self
use crate::_prelude::*;

/// Value attached to a query parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryValue {
	/// Plain string value.
	Str(String),
	/// Unsigned integer value (e.g., `max_age`).
	Number(u64),
	/// Boolean flag.
	Bool(bool),
	/// Nested key-value pairs flattened into sibling parameters.
	Map(BTreeMap<String, String>),
}
impl QueryValue {
	/// Returns `false` for values that must never reach the provider: empty strings, `0`,
	/// `false`, and empty maps.
	pub fn is_truthy(&self) -> bool {
		match self {
			Self::Str(value) => !value.is_empty(),
			Self::Number(value) => *value != 0,
			Self::Bool(value) => *value,
			Self::Map(entries) => !entries.is_empty(),
		}
	}
}
impl From<&str> for QueryValue {
	fn from(value: &str) -> Self {
		Self::Str(value.to_owned())
	}
}
impl From<String> for QueryValue {
	fn from(value: String) -> Self {
		Self::Str(value)
	}
}
impl From<u64> for QueryValue {
	fn from(value: u64) -> Self {
		Self::Number(value)
	}
}
impl From<bool> for QueryValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}
impl From<BTreeMap<String, String>> for QueryValue {
	fn from(value: BTreeMap<String, String>) -> Self {
		Self::Map(value)
	}
}
/// Appends `name=value` to `url`, starting the query component when it is missing.
///
/// A [`QueryValue::Map`] contributes one pair per entry (in key order) and `name` itself is
/// dropped. Entries with empty values are skipped.
pub fn add_query_param(url: impl Into<String>, name: &str, value: &QueryValue) -> String {
	let mut url = url.into();

	match value {
		QueryValue::Map(entries) => {
			for (key, nested) in entries.iter().filter(|(_, nested)| !nested.is_empty()) {
				push_pair(&mut url, key, nested);
			}
		},
		QueryValue::Str(value) => push_pair(&mut url, name, value),
		QueryValue::Number(value) => push_pair(&mut url, name, &value.to_string()),
		QueryValue::Bool(value) => push_pair(&mut url, name, &value.to_string()),
	}

	url
}

fn push_pair(url: &mut String, name: &str, value: &str) {
	if !url.contains('?') {
		url.push('?');
	}
	if !url.ends_with('?') {
		url.push('&');
	}

	url.push_str(&urlencoding::encode(name));
	url.push('=');
	url.push_str(&urlencoding::encode(value));
}
