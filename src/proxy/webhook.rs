// crates.io
use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
// self
use crate::{
	_prelude::*,
	config::keys,
	obs::{self, CallKind},
	proxy::{AppState, ProxyError},
	webhook::{self, WebhookError, WebhookVerifier},
};

pub(super) async fn receive(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Bytes,
) -> Result<Json<Value>, ProxyError> {
	let secret = state
		.settings
		.get(keys::IDENTITY_WEBHOOK_SECRET)
		.ok_or(ProxyError::Misconfigured { what: "Webhook secret" })?;
	let verifier = WebhookVerifier::new(&secret).map_err(ProxyError::internal)?;
	let kind = obs::observe(
		CallKind::Webhook,
		"identity",
		webhook::process(&verifier, state.webhooks.as_ref(), &headers, &body),
	)
	.await
	.map_err(reject)?;

	tracing::debug!(?kind, "identity webhook accepted");

	Ok(Json(serde_json::json!({ "received": true })))
}

fn reject(e: WebhookError) -> ProxyError {
	if e.is_rejection() {
		tracing::warn!(error = %e, "identity webhook rejected");

		ProxyError::bad_request(e.to_string())
	} else {
		ProxyError::internal(e)
	}
}
