// crates.io
use axum::{Json, extract::State};
// self
use crate::{
	_prelude::*,
	config::keys,
	proxy::{AppState, ProxyError},
};

pub(super) async fn healthz() -> Json<Value> {
	Json(serde_json::json!({ "status": "ok" }))
}

/// Browser maps key; the maps SDK loads it client-side.
pub(super) async fn maps_config(State(state): State<AppState>) -> Result<Json<Value>, ProxyError> {
	let key =
		state.settings.get(keys::MAPS_API_KEY).ok_or(ProxyError::Misconfigured { what: "Maps" })?;

	Ok(Json(serde_json::json!({ "apiKey": key })))
}
