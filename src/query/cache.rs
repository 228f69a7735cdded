//! Type-erased entry storage and per-key singleflight guards.

// std
use std::any::Any;
// self
use crate::{
	_prelude::*,
	query::{QueryKey, QueryState, QueryStatus},
};

type Payload = Arc<dyn Any + Send + Sync>;
type EntryMap = Arc<RwLock<HashMap<QueryKey, Entry>>>;
type GuardMap = Arc<Mutex<HashMap<QueryKey, Arc<AsyncMutex<()>>>>>;

#[derive(Clone, Debug, Default)]
struct Entry {
	status: QueryStatus,
	data: Option<Payload>,
	error: Option<ApiError>,
	updated_at: Option<OffsetDateTime>,
	invalidated: bool,
	fetching: bool,
	// Bumped every time a fetch settles or data is written.
	generation: u64,
	// Bumped on every invalidation; a fetch that saw an older value settles as invalidated.
	invalidations: u64,
}
impl Entry {
	fn data<T>(&self) -> Option<T>
	where
		T: 'static + Clone,
	{
		self.data.as_ref().and_then(|payload| payload.downcast_ref::<T>()).cloned()
	}

	fn is_stale(&self, stale_time: Duration, now: OffsetDateTime) -> bool {
		self.invalidated || self.updated_at.is_none_or(|at| now - at >= stale_time)
	}

	fn state<T>(&self, stale_time: Duration, now: OffsetDateTime) -> QueryState<T>
	where
		T: 'static + Clone,
	{
		QueryState {
			data: self.data(),
			status: self.status,
			error: self.error.clone(),
			is_stale: self.is_stale(stale_time, now),
			is_fetching: self.fetching,
		}
	}

	fn store<T>(&mut self, value: T, now: OffsetDateTime)
	where
		T: 'static + Send + Sync,
	{
		self.status = QueryStatus::Success;
		self.data = Some(Arc::new(value));
		self.error = None;
		self.updated_at = Some(now);
		self.invalidated = false;
		self.generation += 1;
	}

	/// Stores a fetched value; it stays invalidated if the key was invalidated mid-fetch.
	fn store_fetched<T>(&mut self, value: T, ticket: FetchTicket, now: OffsetDateTime)
	where
		T: 'static + Send + Sync,
	{
		self.store(value, now);
		self.invalidated = self.invalidations != ticket.0;
	}

	fn invalidate(&mut self) {
		self.invalidated = true;
		self.invalidations += 1;
	}
}

/// Invalidation count observed when a fetch began.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FetchTicket(u64);

/// Outcome of the first, lock-free look at an entry.
pub(crate) enum Lookup<T> {
	Fresh(QueryState<T>),
	Stale(QueryState<T>),
	Miss { generation: u64 },
}

#[derive(Clone, Debug, Default)]
pub(crate) struct QueryCache {
	entries: EntryMap,
	guards: GuardMap,
}
impl QueryCache {
	pub(crate) fn lookup<T>(
		&self,
		key: &QueryKey,
		stale_time: Duration,
		now: OffsetDateTime,
	) -> Lookup<T>
	where
		T: 'static + Clone,
	{
		let entries = self.entries.read();
		let Some(entry) = entries.get(key) else {
			return Lookup::Miss { generation: 0 };
		};

		match (entry.status, entry.invalidated, entry.data::<T>()) {
			(QueryStatus::Success, false, Some(_)) if entry.is_stale(stale_time, now) =>
				Lookup::Stale(entry.state(stale_time, now)),
			(QueryStatus::Success, false, Some(_)) => Lookup::Fresh(entry.state(stale_time, now)),
			_ => Lookup::Miss { generation: entry.generation },
		}
	}

	pub(crate) fn guard(&self, key: &QueryKey) -> Arc<AsyncMutex<()>> {
		self.guards.lock().entry(key.clone()).or_default().clone()
	}

	/// Drops the key's guard once no caller holds or awaits it.
	///
	/// Guards are only cloned under the map lock, so a count of one means the map owns the
	/// last reference.
	pub(crate) fn release_guard(&self, key: &QueryKey) {
		let mut guards = self.guards.lock();

		if guards.get(key).is_some_and(|guard| Arc::strong_count(guard) == 1) {
			guards.remove(key);
		}
	}

	/// Returns the entry if another caller settled it after `generation` was observed.
	pub(crate) fn settled_since<T>(
		&self,
		key: &QueryKey,
		generation: u64,
		stale_time: Duration,
		now: OffsetDateTime,
	) -> Option<QueryState<T>>
	where
		T: 'static + Clone,
	{
		let entries = self.entries.read();
		let entry = entries.get(key)?;
		let settled = matches!(entry.status, QueryStatus::Success | QueryStatus::Error);

		(settled && !entry.invalidated && entry.generation != generation)
			.then(|| entry.state(stale_time, now))
	}

	/// Marks a fetch as started; foreground fetches also move the entry to `Loading`.
	pub(crate) fn begin_fetch(&self, key: &QueryKey, foreground: bool) -> FetchTicket {
		let mut entries = self.entries.write();
		let entry = entries.entry(key.clone()).or_default();

		entry.fetching = true;

		if foreground {
			entry.status = QueryStatus::Loading;
		}

		FetchTicket(entry.invalidations)
	}

	pub(crate) fn settle<T>(
		&self,
		key: &QueryKey,
		ticket: FetchTicket,
		result: Result<T, ApiError>,
		stale_time: Duration,
		now: OffsetDateTime,
	) -> QueryState<T>
	where
		T: 'static + Clone + Send + Sync,
	{
		let mut entries = self.entries.write();
		let entry = entries.entry(key.clone()).or_default();

		entry.fetching = false;

		match result {
			Ok(value) => entry.store_fetched(value, ticket, now),
			Err(err) => {
				entry.status = QueryStatus::Error;
				entry.error = Some(err);
				entry.generation += 1;
			},
		}

		entry.state(stale_time, now)
	}

	/// Settles a background refresh; a failure keeps the stale payload and its status.
	pub(crate) fn settle_background<T>(
		&self,
		key: &QueryKey,
		ticket: FetchTicket,
		result: Result<T, ApiError>,
		now: OffsetDateTime,
	) where
		T: 'static + Send + Sync,
	{
		let mut entries = self.entries.write();
		let entry = entries.entry(key.clone()).or_default();

		entry.fetching = false;

		match result {
			Ok(value) => entry.store_fetched(value, ticket, now),
			Err(err) => entry.error = Some(err),
		}
	}

	pub(crate) fn invalidate(&self, key: &QueryKey) -> bool {
		match self.entries.write().get_mut(key) {
			Some(entry) => {
				entry.invalidate();

				true
			},
			None => false,
		}
	}

	pub(crate) fn invalidate_matching(&self, filter: &QueryKey) -> usize {
		let mut entries = self.entries.write();
		let mut count = 0;

		for (_, entry) in entries.iter_mut().filter(|(key, _)| key.matches(filter)) {
			entry.invalidate();
			count += 1;
		}

		count
	}

	pub(crate) fn invalidated_keys(&self) -> Vec<QueryKey> {
		let mut keys = self
			.entries
			.read()
			.iter()
			.filter(|(_, entry)| entry.invalidated)
			.map(|(key, _)| key.clone())
			.collect::<Vec<_>>();

		keys.sort();

		keys
	}

	pub(crate) fn get<T>(&self, key: &QueryKey) -> Option<T>
	where
		T: 'static + Clone,
	{
		self.entries.read().get(key).and_then(Entry::data::<T>)
	}

	pub(crate) fn update<T, F>(&self, key: &QueryKey, updater: F, now: OffsetDateTime)
	where
		T: 'static + Clone + Send + Sync,
		F: FnOnce(Option<T>) -> T,
	{
		let mut entries = self.entries.write();
		let entry = entries.entry(key.clone()).or_default();
		let next = updater(entry.data());

		entry.store(next, now);
	}

	pub(crate) fn state<T>(
		&self,
		key: &QueryKey,
		stale_time: Duration,
		now: OffsetDateTime,
	) -> QueryState<T>
	where
		T: 'static + Clone,
	{
		self.entries
			.read()
			.get(key)
			.map_or_else(QueryState::idle, |entry| entry.state(stale_time, now))
	}

	pub(crate) fn remove(&self, key: &QueryKey) -> bool {
		let removed = self.entries.write().remove(key).is_some();

		self.release_guard(key);

		removed
	}

	/// Drops every entry and every guard nobody is holding.
	pub(crate) fn clear(&self) {
		self.entries.write().clear();
		self.guards.lock().retain(|_, guard| Arc::strong_count(guard) > 1);
	}

	#[cfg(test)]
	pub(crate) fn guard_count(&self) -> usize {
		self.guards.lock().len()
	}
}
