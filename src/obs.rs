//! Observability helpers for outbound calls and proxy routes.
//!
//! - Every call runs inside a `tracing` span named `marketplace_gateway.call` with the `kind`
//!   (call family) and `stage` (call site) fields.
//! - Each finished call emits a `call finished` debug event with its outcome and duration.
//! - Enable the `metrics` feature to also feed `marketplace_gateway_calls_total` and
//!   `marketplace_gateway_call_duration_seconds`, labeled by `kind`, `stage` and `outcome`.

mod span;

pub use span::*;

// std
use std::time::Instant;
// self
use crate::_prelude::*;

/// Families of calls observed by the gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Request to the backend REST service.
	Backend,
	/// Request to the reverse-geocoding provider.
	Geocoding,
	/// Upload to object storage.
	Storage,
	/// Cached read through the query client.
	Query,
	/// Write through the query client.
	Mutation,
	/// Inbound proxy route.
	Route,
	/// Inbound identity-provider webhook.
	Webhook,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Backend => "backend",
			CallKind::Geocoding => "geocoding",
			CallKind::Storage => "storage",
			CallKind::Query => "query",
			CallKind::Mutation => "mutation",
			CallKind::Route => "route",
			CallKind::Webhook => "webhook",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// How one observed call ended, with its wall-clock duration.
#[derive(Clone, Copy, Debug)]
pub struct CallRecord {
	/// Call family.
	pub kind: CallKind,
	/// Call site within the family.
	pub stage: &'static str,
	/// Whether the call returned `Ok`.
	pub succeeded: bool,
	/// Time spent inside the call.
	pub elapsed: std::time::Duration,
}
impl CallRecord {
	/// Outcome label used on log events and metrics.
	pub const fn outcome(&self) -> &'static str {
		if self.succeeded { "ok" } else { "error" }
	}

	/// Emits the record as a debug event and, with the `metrics` feature, as a counter plus a
	/// duration histogram labeled by `kind`, `stage` and `outcome`.
	pub fn emit(&self) {
		tracing::debug!(
			kind = self.kind.as_str(),
			stage = self.stage,
			outcome = self.outcome(),
			elapsed_ms = self.elapsed.as_millis() as u64,
			"call finished"
		);

		#[cfg(feature = "metrics")]
		{
			metrics::counter!(
				"marketplace_gateway_calls_total",
				"kind" => self.kind.as_str(),
				"stage" => self.stage,
				"outcome" => self.outcome()
			)
			.increment(1);
			metrics::histogram!(
				"marketplace_gateway_call_duration_seconds",
				"kind" => self.kind.as_str(),
				"stage" => self.stage,
				"outcome" => self.outcome()
			)
			.record(self.elapsed.as_secs_f64());
		}
	}
}

/// Runs `fut` inside a call span, then emits a [`CallRecord`] for it.
pub async fn observe<T, E, Fut>(kind: CallKind, stage: &'static str, fut: Fut) -> Result<T, E>
where
	Fut: Future<Output = Result<T, E>>,
{
	let span = CallSpan::new(kind, stage);
	let started = Instant::now();
	let result = span.instrument(fut).await;

	CallRecord { kind, stage, succeeded: result.is_ok(), elapsed: started.elapsed() }.emit();

	result
}
