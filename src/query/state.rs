//! Read-side view of a cache entry.

// self
use crate::_prelude::*;

/// Lifecycle of one cache entry: `Idle → Loading → {Success | Error}`.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum QueryStatus {
	#[default]
	Idle,
	Loading,
	Success,
	Error,
}

/// Snapshot handed to callers of [`QueryClient::fetch`](crate::query::QueryClient::fetch).
///
/// `data` may be present alongside an `Error` status when a refetch failed after an
/// earlier success.
#[derive(Clone, Debug)]
pub struct QueryState<T> {
	/// Last successful payload.
	pub data: Option<T>,
	/// Entry status at snapshot time.
	pub status: QueryStatus,
	/// Last failure, if the most recent fetch failed.
	pub error: Option<ApiError>,
	/// `true` when `data` is older than the stale window or was invalidated.
	pub is_stale: bool,
	/// `true` while a fetch (foreground or background) is in flight for this key.
	pub is_fetching: bool,
}
impl<T> QueryState<T> {
	/// Snapshot of a key nothing has fetched yet.
	pub fn idle() -> Self {
		Self {
			data: None,
			status: QueryStatus::Idle,
			error: None,
			is_stale: true,
			is_fetching: false,
		}
	}

	/// `true` while the first result is awaited.
	pub fn is_loading(&self) -> bool {
		self.status == QueryStatus::Loading
	}

	/// `true` when the last fetch failed.
	pub fn is_error(&self) -> bool {
		self.status == QueryStatus::Error
	}

	/// `true` when the last fetch succeeded.
	pub fn is_success(&self) -> bool {
		self.status == QueryStatus::Success
	}

	/// Converts the snapshot into its payload or its error.
	///
	/// A state with neither (idle or loading) reports [`ApiError::Unknown`].
	pub fn into_result(self) -> Result<T, ApiError> {
		match (self.status, self.data, self.error) {
			(QueryStatus::Success, Some(data), _) => Ok(data),
			(_, _, Some(err)) => Err(err),
			(status, _, None) => {
				Err(ApiError::Unknown { cause: format!("query settled without data ({status:?})") })
			},
		}
	}
}
