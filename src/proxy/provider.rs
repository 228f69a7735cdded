//! Owner-listing routes: profile read/update and the hero-image handshake.

// crates.io
use axum::{
	body::Bytes,
	extract::State,
	http::HeaderMap,
	response::Response,
};
// self
use crate::{
	_prelude::*,
	api::{self, HeroConfirm},
	config::keys,
	proxy::{AppState, ProxyError, json_body, optional_json, relayed},
};

pub(super) async fn show(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Response, ProxyError> {
	let session = state.session(&headers).await?;

	Ok(relayed(state.relay(&session, Method::GET, "providers/me", None).await?))
}

pub(super) async fn update(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Bytes,
) -> Result<Response, ProxyError> {
	let session = state.session(&headers).await?;
	let update = json_body::<Value>(&body)?;

	if !update.is_object() {
		return Err(ProxyError::bad_request("Request body must be a JSON object"));
	}

	Ok(relayed(state.relay(&session, Method::PUT, "providers/me", Some(&update)).await?))
}

pub(super) async fn hero_upload_url(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Bytes,
) -> Result<Response, ProxyError> {
	let session = state.session(&headers).await?;
	let request = optional_json(&body);

	Ok(relayed(
		state
			.relay(&session, Method::POST, "providers/me/hero-image/upload-url", request.as_ref())
			.await?,
	))
}

pub(super) async fn hero_confirm(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Bytes,
) -> Result<Response, ProxyError> {
	let session = state.session(&headers).await?;
	let confirm = json_body::<HeroConfirm>(&body)?;

	if confirm.object_key.trim().is_empty() {
		return Err(ProxyError::bad_request("`object_key` is required"));
	}

	let payload = serde_json::to_value(&confirm).map_err(ProxyError::internal)?;
	let mut confirmed = state
		.relay(&session, Method::POST, "providers/me/hero-image/confirm", Some(&payload))
		.await?;

	complete_public_url(
		&mut confirmed.body,
		&confirm.object_key,
		state.settings.get(keys::STORAGE_PUBLIC_URL),
	);

	Ok(relayed(confirmed))
}

/// Fills `public_url` from the storage base when the backend left it out.
fn complete_public_url(body: &mut Value, object_key: &str, storage_base: Option<String>) {
	let has_url = body.get("public_url").and_then(Value::as_str).is_some_and(|url| !url.is_empty());

	if has_url {
		return;
	}

	let Some(url) = storage_base.and_then(|base| api::public_object_url(&base, object_key)) else {
		return;
	};

	match body {
		Value::Object(map) => {
			map.insert("public_url".into(), Value::String(url));
		},
		Value::Null => *body = serde_json::json!({ "public_url": url }),
		_ => {},
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn public_url_is_completed_only_when_missing() {
		let mut missing = serde_json::json!({ "success": true });

		complete_public_url(&mut missing, "heroes/1.png", Some("https://cdn.example.com".into()));

		assert_eq!(missing["public_url"], "https://cdn.example.com/heroes/1.png");

		let mut present = serde_json::json!({ "public_url": "https://other.example.com/x.png" });

		complete_public_url(&mut present, "heroes/1.png", Some("https://cdn.example.com".into()));

		assert_eq!(present["public_url"], "https://other.example.com/x.png");

		let mut unconfigured = serde_json::json!({});

		complete_public_url(&mut unconfigured, "heroes/1.png", None);

		assert!(unconfigured.get("public_url").is_none());
	}
}
