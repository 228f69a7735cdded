// crates.io
use tracing::instrument::Instrumented;
// self
use crate::{_prelude::*, obs::CallKind};

/// Span attached to one outbound call or inbound route.
#[derive(Clone, Debug)]
pub struct CallSpan {
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a span tagged with the call kind and stage.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		Self { span: tracing::info_span!("marketplace_gateway.call", kind = kind.as_str(), stage) }
	}

	/// Instruments a future without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		tracing::Instrument::instrument(fut, self.span.clone())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_passes_the_output_through() {
		let span = CallSpan::new(CallKind::Backend, "instrument");
		let value = CallSpan::instrument(&span, async { 42 }).await;
		let value = span.instrument(async move { value + 1 }).await;

		assert_eq!(value, 43);
	}
}
