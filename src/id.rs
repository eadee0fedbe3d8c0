//! Correlation identifiers binding a pending signin to the provider's redirect-back.

// std
use std::{borrow::Borrow, ops::Deref};
// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::_prelude::*;

const CORRELATION_ID_LEN: usize = 32;
const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("Correlation identifier cannot be empty.")]
	Empty,
	/// The identifier contains whitespace characters.
	#[error("Correlation identifier contains whitespace.")]
	ContainsWhitespace,
	/// The identifier exceeded the allowed character count.
	#[error("Correlation identifier exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Random value sent to the provider as `state` and used as the pending-signin storage key.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CorrelationId(String);
impl CorrelationId {
	/// Draws a fresh identifier of 32 alphanumeric characters from the thread-local CSPRNG.
	pub fn generate() -> Self {
		Self(rand::rng().sample_iter(Alphanumeric).take(CORRELATION_ID_LEN).map(char::from).collect())
	}

	/// Wraps an existing identifier (e.g., the `state` echoed back by the provider).
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for CorrelationId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for CorrelationId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for CorrelationId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<CorrelationId> for String {
	fn from(value: CorrelationId) -> Self {
		value.0
	}
}
impl TryFrom<String> for CorrelationId {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl FromStr for CorrelationId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for CorrelationId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "CorrelationId({})", self.0)
	}
}
impl Display for CorrelationId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn validate_view(view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace);
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashSet;
	// self
	use super::*;

	#[test]
	fn generated_ids_are_alphanumeric_and_distinct() {
		let ids: HashSet<CorrelationId> = (0..256).map(|_| CorrelationId::generate()).collect();

		assert_eq!(ids.len(), 256, "Generated identifiers must not collide.");

		for id in &ids {
			assert_eq!(id.len(), CORRELATION_ID_LEN);
			assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
		}
	}

	#[test]
	fn validation_rejects_empty_and_whitespace() {
		assert_eq!(CorrelationId::new(""), Err(IdentifierError::Empty));
		assert_eq!(CorrelationId::new("a b"), Err(IdentifierError::ContainsWhitespace));
		assert!(CorrelationId::new("a".repeat(IDENTIFIER_MAX_LEN + 1)).is_err());

		let id = CorrelationId::new("abc123").expect("Plain identifier should be valid.");

		assert_eq!(&*id, "abc123");
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let id: CorrelationId =
			serde_json::from_str("\"state-42\"").expect("Identifier should deserialize.");

		assert_eq!(id.to_string(), "state-42");
		assert!(serde_json::from_str::<CorrelationId>("\"with space\"").is_err());
	}
}
