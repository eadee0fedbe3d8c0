//! Explicit discovery cache with singleflight fetch de-duplication.

// self
use crate::{_prelude::*, metadata::DiscoveryDocument};

/// Lifecycle of a [`MetadataCache`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheStatus {
	/// No document yet and no fetch has started.
	Unfetched,
	/// A fetch is in flight; other callers wait for it instead of issuing their own.
	Fetching,
	/// A document is cached and will be served for the lifetime of the cache.
	Ready,
	/// The last fetch failed; the next caller retries.
	Failed,
}
impl CacheStatus {
	/// Returns a stable label suitable for span or log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CacheStatus::Unfetched => "unfetched",
			CacheStatus::Fetching => "fetching",
			CacheStatus::Ready => "ready",
			CacheStatus::Failed => "failed",
		}
	}
}
impl Display for CacheStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[derive(Debug)]
struct CacheSlot {
	status: CacheStatus,
	document: Option<Arc<DiscoveryDocument>>,
	// Completed fetch attempts; cancelled attempts do not count.
	generation: u64,
	last_error: Option<Error>,
}
impl CacheSlot {
	fn new(status: CacheStatus, document: Option<Arc<DiscoveryDocument>>) -> Self {
		Self { status, document, generation: 0, last_error: None }
	}
}

/// Holds at most one discovery document; once populated it is never refetched.
#[derive(Debug)]
pub struct MetadataCache {
	slot: RwLock<CacheSlot>,
	singleflight: AsyncMutex<()>,
}
impl MetadataCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self {
			slot: RwLock::new(CacheSlot::new(CacheStatus::Unfetched, None)),
			singleflight: AsyncMutex::new(()),
		}
	}

	/// Creates a cache that is already [`CacheStatus::Ready`].
	pub fn ready(document: DiscoveryDocument) -> Self {
		Self {
			slot: RwLock::new(CacheSlot::new(CacheStatus::Ready, Some(Arc::new(document)))),
			singleflight: AsyncMutex::new(()),
		}
	}

	/// Current lifecycle state.
	pub fn status(&self) -> CacheStatus {
		self.slot.read().status
	}

	/// Cached document, if any.
	pub fn get(&self) -> Option<Arc<DiscoveryDocument>> {
		self.slot.read().document.clone()
	}

	/// Returns the cached document or runs `fetch` to populate it.
	///
	/// Callers that queue behind an in-flight fetch receive that fetch's outcome, success or
	/// failure, so at most one request runs per wave of concurrent callers. A call that starts
	/// after a failed fetch retries. Dropping the future mid-fetch restores the previous status
	/// and lets the next queued caller fetch instead.
	pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<Arc<DiscoveryDocument>>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<DiscoveryDocument>>,
	{
		let observed = {
			let slot = self.slot.read();

			if let Some(document) = &slot.document {
				return Ok(document.clone());
			}

			slot.generation
		};
		let _singleflight = self.singleflight.lock().await;

		{
			let slot = self.slot.read();

			if let Some(document) = &slot.document {
				return Ok(document.clone());
			}
			if let Some(e) = slot.last_error.as_ref().filter(|_| slot.generation != observed) {
				return Err(e.clone());
			}
		}

		let attempt = FetchAttempt::begin(&self.slot);
		let result = fetch().await;

		attempt.finish(result)
	}
}

// Marks the cache as fetching; restores the previous status if dropped before `finish`.
struct FetchAttempt<'a> {
	slot: &'a RwLock<CacheSlot>,
	previous: CacheStatus,
	settled: bool,
}
impl<'a> FetchAttempt<'a> {
	fn begin(slot: &'a RwLock<CacheSlot>) -> Self {
		let previous = std::mem::replace(&mut slot.write().status, CacheStatus::Fetching);

		Self { slot, previous, settled: false }
	}

	fn finish(mut self, result: Result<DiscoveryDocument>) -> Result<Arc<DiscoveryDocument>> {
		let lock = self.slot;

		self.settled = true;

		let mut slot = lock.write();

		slot.generation += 1;

		match result {
			Ok(document) => {
				let document = Arc::new(document);

				slot.status = CacheStatus::Ready;
				slot.document = Some(document.clone());
				slot.last_error = None;

				Ok(document)
			},
			Err(e) => {
				slot.status = CacheStatus::Failed;
				slot.last_error = Some(e.clone());

				Err(e)
			},
		}
	}
}
impl Drop for FetchAttempt<'_> {
	fn drop(&mut self) {
		if !self.settled {
			self.slot.write().status = self.previous;
		}
	}
}
impl Default for MetadataCache {
	fn default() -> Self {
		Self::new()
	}
}
