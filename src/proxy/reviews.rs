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
	api::NewReview,
	auth::ReviewId,
	proxy::{AppState, ProxyError, json_body, relayed},
};

pub(super) async fn create(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Bytes,
) -> Result<Response, ProxyError> {
	let session = state.session(&headers).await?;
	let review = json_body::<NewReview>(&body)?;

	review.validate()?;

	let payload = serde_json::to_value(&review).map_err(ProxyError::internal)?;

	Ok(relayed(state.relay(&session, Method::POST, "reviews", Some(&payload)).await?))
}

pub(super) async fn remove(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(id): Path<String>,
) -> Result<Response, ProxyError> {
	let session = state.session(&headers).await?;
	let id =
		id.parse::<ReviewId>().map_err(|_| ProxyError::bad_request("Review id must be numeric"))?;

	Ok(relayed(state.relay(&session, Method::DELETE, &format!("reviews/{id}"), None).await?))
}
