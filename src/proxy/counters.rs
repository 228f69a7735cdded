// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for proxy traffic.
#[derive(Debug, Default)]
pub struct ProxyMetrics {
	requests: AtomicU64,
	upstream_calls: AtomicU64,
	rejections: AtomicU64,
	failures: AtomicU64,
}
impl ProxyMetrics {
	/// Requests that reached the router.
	pub fn requests(&self) -> u64 {
		self.requests.load(Ordering::Relaxed)
	}

	/// Outbound calls made on behalf of requests.
	pub fn upstream_calls(&self) -> u64 {
		self.upstream_calls.load(Ordering::Relaxed)
	}

	/// Responses with a 4xx status.
	pub fn rejections(&self) -> u64 {
		self.rejections.load(Ordering::Relaxed)
	}

	/// Responses with a 5xx status.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_request(&self) {
		self.requests.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_upstream_call(&self) {
		self.upstream_calls.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_rejection(&self) {
		self.rejections.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}
}
