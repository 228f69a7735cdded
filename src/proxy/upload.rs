// crates.io
use axum::{
	Json,
	body::Body,
	extract::{Query, State, rejection::QueryRejection},
	http::{HeaderMap, header::CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	proxy::{AppState, ProxyError},
};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
pub(super) struct UploadTarget {
	url: Option<String>,
}

/// Streams the request body to a pre-signed storage URL.
///
/// The target must live on the configured storage origin, and the backend has to accept the
/// caller's token before anything is forwarded.
pub(super) async fn put_object(
	State(state): State<AppState>,
	headers: HeaderMap,
	target: Result<Query<UploadTarget>, QueryRejection>,
	body: Body,
) -> Result<Json<Value>, ProxyError> {
	state.session(&headers).await?;

	let Query(target) = target.map_err(|e| ProxyError::bad_request(e.body_text()))?;
	let url = upload_url(&state, target)?;
	let session = state.confirmed_session(&headers).await?;
	let content_type = headers
		.get(CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.filter(|value| !value.trim().is_empty())
		.unwrap_or(DEFAULT_CONTENT_TYPE)
		.to_owned();

	tracing::debug!(
		user = %session.user_id,
		host = ?url.host_str(),
		"forwarding upload to storage"
	);
	state.metrics.record_upstream_call();
	state
		.public_backend()
		.put_body(url, &content_type, reqwest::Body::wrap_stream(body.into_data_stream()))
		.await?;

	Ok(Json(serde_json::json!({ "success": true })))
}

fn upload_url(state: &AppState, target: UploadTarget) -> Result<Url, ProxyError> {
	let raw = target
		.url
		.filter(|url| !url.trim().is_empty())
		.ok_or_else(|| ProxyError::bad_request("`url` query parameter is required"))?;
	let url = Url::parse(raw.trim())
		.ok()
		.filter(|url| matches!(url.scheme(), "http" | "https"))
		.ok_or_else(|| ProxyError::bad_request("`url` must be an absolute http(s) URL"))?;
	let allowed = match state.settings().storage_upload_origin() {
		Ok(Some(origin)) => origin,
		Ok(None) => return Err(ProxyError::Misconfigured { what: "Storage upload origin" }),
		Err(e) => {
			tracing::error!(error = %e, "storage upload origin is unusable");

			return Err(ProxyError::Misconfigured { what: "Storage upload origin" });
		},
	};

	if url.origin() != allowed {
		return Err(ProxyError::bad_request("`url` does not point at the storage bucket"));
	}

	Ok(url)
}
