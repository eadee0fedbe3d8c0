//! User-agent navigation, the terminal side effect of a signin redirect.

// self
use crate::_prelude::*;

/// Sends the user agent to a URL.
///
/// Browser hosts implement this with a full-page navigation; control is not expected to
/// return to the application afterwards, so the call cannot fail observably.
pub trait Navigator
where
	Self: Send + Sync,
{
	/// Navigates to `url`.
	fn navigate(&self, url: &Url);
}

/// Navigator that records every URL instead of leaving the application.
///
/// Useful for headless hosts that hand the URL to another process, and for tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingNavigator(Arc<Mutex<Vec<Url>>>);
impl RecordingNavigator {
	/// Every URL navigated to so far, oldest first.
	pub fn visited(&self) -> Vec<Url> {
		self.0.lock().clone()
	}

	/// The most recent navigation target.
	pub fn last(&self) -> Option<Url> {
		self.0.lock().last().cloned()
	}
}
impl Navigator for RecordingNavigator {
	fn navigate(&self, url: &Url) {
		self.0.lock().push(url.clone());
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recording_navigator_keeps_history() {
		let navigator = RecordingNavigator::default();
		let first = Url::parse("https://idp.example.com/auth?a=1").expect("Fixture should parse.");
		let second = Url::parse("https://idp.example.com/auth?a=2").expect("Fixture should parse.");

		navigator.navigate(&first);
		navigator.navigate(&second);

		assert_eq!(navigator.visited(), vec![first, second.clone()]);
		assert_eq!(navigator.last(), Some(second));
	}
}
