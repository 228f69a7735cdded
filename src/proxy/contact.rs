// crates.io
use axum::{Json, body::Bytes, extract::State};
// self
use crate::{
	_prelude::*,
	api::ContactMessage,
	proxy::{AppState, ProxyError, json_body},
};

pub(super) async fn submit(
	State(state): State<AppState>,
	body: Bytes,
) -> Result<Json<Value>, ProxyError> {
	let message = json_body::<ContactMessage>(&body)?;

	message.validate()?;
	state.metrics.record_upstream_call();
	state.public_backend().send_contact(&message).await?;

	Ok(Json(serde_json::json!({ "success": true })))
}
