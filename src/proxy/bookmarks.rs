// crates.io
use axum::{
	body::Bytes,
	extract::{Path, State},
	http::HeaderMap,
	response::Response,
};
// self
use crate::{
	_prelude::*,
	api::NewBookmark,
	auth::ProviderId,
	proxy::{AppState, ProxyError, json_body, relayed},
};

pub(super) async fn list(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Response, ProxyError> {
	let session = state.session(&headers).await?;

	Ok(relayed(state.relay(&session, Method::GET, "bookmarks", None).await?))
}

pub(super) async fn create(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Bytes,
) -> Result<Response, ProxyError> {
	let session = state.session(&headers).await?;
	let bookmark = json_body::<NewBookmark>(&body)?;
	let payload = serde_json::to_value(bookmark).map_err(ProxyError::internal)?;

	Ok(relayed(state.relay(&session, Method::POST, "bookmarks", Some(&payload)).await?))
}

pub(super) async fn remove(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(provider_id): Path<String>,
) -> Result<Response, ProxyError> {
	let session = state.session(&headers).await?;
	let provider = provider_id
		.parse::<ProviderId>()
		.map_err(|_| ProxyError::bad_request("Provider id must be numeric"))?;

	let path = format!("bookmarks/{provider}");

	Ok(relayed(state.relay(&session, Method::DELETE, &path, None).await?))
}
