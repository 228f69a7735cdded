//! Keyed query cache with stale-time policy, singleflight reads, and mutation invalidation.
//!
//! Reads go through [`QueryClient::fetch`]:
//! - a fresh success is served from memory without touching the network;
//! - a stale success (past the window, not invalidated) is served immediately while one
//!   background refresh runs;
//! - anything else (missing, failed, invalidated) enters `Loading` and awaits one fetch.
//!
//! Concurrent readers of one key share a single in-flight fetch: the first caller takes the
//! key's guard, the rest wait on it and re-check the cache before fetching themselves.

mod cache;
mod key;
mod state;

pub use key::*;
pub use state::*;

// self
use crate::{
	_prelude::*,
	obs::{self, CallKind},
	query::cache::{Lookup, QueryCache},
};

/// Per-read policy knobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryOptions {
	/// Age after which a successful entry is considered stale.
	pub stale_time: Duration,
	/// Extra attempts for retryable failures (network, 5xx, 408, 429).
	pub retry: u8,
	/// Pause between attempts.
	pub retry_delay: Duration,
}
impl QueryOptions {
	const DEFAULT_RETRY: u8 = 1;
	const DEFAULT_RETRY_DELAY: Duration = Duration::milliseconds(200);
	const DEFAULT_STALE_TIME: Duration = Duration::seconds(60);

	/// Overrides the stale window (defaults to 60 seconds).
	pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
		self.stale_time = if stale_time.is_negative() { Duration::ZERO } else { stale_time };

		self
	}

	/// Overrides the retry budget (defaults to 1).
	pub fn with_retry(mut self, retry: u8) -> Self {
		self.retry = retry;

		self
	}

	/// Overrides the pause between attempts.
	pub fn with_retry_delay(mut self, delay: Duration) -> Self {
		self.retry_delay = delay;

		self
	}
}
impl Default for QueryOptions {
	fn default() -> Self {
		Self {
			stale_time: Self::DEFAULT_STALE_TIME,
			retry: Self::DEFAULT_RETRY,
			retry_delay: Self::DEFAULT_RETRY_DELAY,
		}
	}
}

/// Shared query cache; clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct QueryClient {
	cache: QueryCache,
	options: QueryOptions,
}
impl QueryClient {
	/// Creates a client whose reads default to `options`.
	pub fn new(options: QueryOptions) -> Self {
		Self { cache: QueryCache::default(), options }
	}

	/// Default read options.
	pub fn options(&self) -> QueryOptions {
		self.options
	}

	/// Reads `key` through the cache, calling `fetcher` only when the entry needs it.
	///
	/// Must run inside a Tokio runtime; stale hits spawn their refresh onto it.
	pub async fn fetch<T, F, Fut>(
		&self,
		key: QueryKey,
		options: QueryOptions,
		fetcher: F,
	) -> QueryState<T>
	where
		T: 'static + Clone + Send + Sync,
		F: 'static + Send + Sync + Fn() -> Fut,
		Fut: 'static + Send + Future<Output = Result<T, ApiError>>,
	{
		let now = OffsetDateTime::now_utc();
		let generation = match self.cache.lookup::<T>(&key, options.stale_time, now) {
			Lookup::Fresh(state) => return state,
			Lookup::Stale(state) => {
				self.spawn_refresh(key, options, fetcher);

				return state;
			},
			Lookup::Miss { generation } => generation,
		};
		let guard = self.cache.guard(&key);
		let lock = guard.lock().await;
		let state = self.fetch_locked(&key, generation, options, &fetcher).await;

		drop(lock);
		drop(guard);
		self.cache.release_guard(&key);

		state
	}

	async fn fetch_locked<T, F, Fut>(
		&self,
		key: &QueryKey,
		generation: u64,
		options: QueryOptions,
		fetcher: &F,
	) -> QueryState<T>
	where
		T: 'static + Clone + Send + Sync,
		F: Fn() -> Fut,
		Fut: Future<Output = Result<T, ApiError>>,
	{
		if let Some(state) =
			self.cache.settled_since(key, generation, options.stale_time, OffsetDateTime::now_utc())
		{
			tracing::debug!(key = %key, "sharing result settled by a concurrent fetch");

			return state;
		}

		let ticket = self.cache.begin_fetch(key, true);
		let result = run_with_retry(key, options, fetcher).await;

		if let Err(e) = &result {
			tracing::warn!(key = %key, error = %e, "query fetch failed");
		}

		self.cache.settle(key, ticket, result, options.stale_time, OffsetDateTime::now_utc())
	}

	/// Runs `mutation` exactly once; on success invalidates every key in `affected`.
	pub async fn mutate<T, Fut>(&self, affected: &[QueryKey], mutation: Fut) -> Result<T, ApiError>
	where
		Fut: Future<Output = Result<T, ApiError>>,
	{
		let value = obs::observe(CallKind::Mutation, "mutate", mutation).await?;

		for key in affected {
			self.cache.invalidate(key);
		}

		Ok(value)
	}

	/// Marks one entry stale-and-unusable; returns `false` when nothing is cached for it.
	pub fn invalidate(&self, key: &QueryKey) -> bool {
		self.cache.invalidate(key)
	}

	/// Invalidates every entry matching `filter` (same resource, parameter superset).
	pub fn invalidate_matching(&self, filter: &QueryKey) -> usize {
		self.cache.invalidate_matching(filter)
	}

	/// Keys currently flagged as invalidated, sorted.
	pub fn invalidated_keys(&self) -> Vec<QueryKey> {
		self.cache.invalidated_keys()
	}

	/// Cached payload for `key`, regardless of freshness.
	pub fn get_query_data<T>(&self, key: &QueryKey) -> Option<T>
	where
		T: 'static + Clone,
	{
		self.cache.get(key)
	}

	/// Writes a payload computed from the current one; the entry becomes a fresh success.
	pub fn set_query_data<T, F>(&self, key: &QueryKey, updater: F)
	where
		T: 'static + Clone + Send + Sync,
		F: FnOnce(Option<T>) -> T,
	{
		self.cache.update(key, updater, OffsetDateTime::now_utc());
	}

	/// Snapshot of `key` without fetching.
	pub fn peek<T>(&self, key: &QueryKey) -> QueryState<T>
	where
		T: 'static + Clone,
	{
		self.cache.state(key, self.options.stale_time, OffsetDateTime::now_utc())
	}

	/// Drops one entry.
	pub fn remove(&self, key: &QueryKey) -> bool {
		self.cache.remove(key)
	}

	/// Drops every entry (sign-out).
	pub fn clear(&self) {
		self.cache.clear();
	}

	fn spawn_refresh<T, F, Fut>(&self, key: QueryKey, options: QueryOptions, fetcher: F)
	where
		T: 'static + Clone + Send + Sync,
		F: 'static + Send + Sync + Fn() -> Fut,
		Fut: 'static + Send + Future<Output = Result<T, ApiError>>,
	{
		// A held guard means a refresh or foreground fetch is already running.
		let Some(lock) = self.cache.guard(&key).try_lock_arc() else {
			self.cache.release_guard(&key);

			return;
		};
		let cache = self.cache.clone();
		let ticket = cache.begin_fetch(&key, false);

		tokio::spawn(async move {
			let result = run_with_retry(&key, options, &fetcher).await;

			if let Err(e) = &result {
				tracing::warn!(
					key = %key,
					error = %e,
					"background refresh failed; keeping stale data"
				);
			}

			cache.settle_background(&key, ticket, result, OffsetDateTime::now_utc());
			drop(lock);
			cache.release_guard(&key);
		});
	}
}

async fn run_with_retry<T, F, Fut>(
	key: &QueryKey,
	options: QueryOptions,
	fetcher: &F,
) -> Result<T, ApiError>
where
	F: Fn() -> Fut,
	Fut: Future<Output = Result<T, ApiError>>,
{
	let mut attempt = 0_u8;

	loop {
		match obs::observe(CallKind::Query, key.resource().as_str(), fetcher()).await {
			Ok(value) => return Ok(value),
			Err(e) if attempt < options.retry && e.is_retryable() => {
				attempt += 1;

				tracing::debug!(key = %key, attempt, error = %e, "retrying query fetch");
				tokio::time::sleep(options.retry_delay.unsigned_abs()).await;
			},
			Err(e) => return Err(e),
		}
	}
}
