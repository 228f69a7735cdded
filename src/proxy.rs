//! Server-side proxy routes (axum).
//!
//! Each route re-derives the session from the inbound request, performs exactly one
//! outbound call (backend, geocoding, or storage), and reshapes failures through
//! [`ProxyError`]. Uploads are the exception: the backend confirms the session before any
//! bytes go to storage. Nothing is retried here; retries belong to the client-side query
//! layer.

mod bookmarks;
mod contact;
mod counters;
mod error;
mod geocode;
mod provider;
mod reviews;
mod status;
mod upload;
mod webhook;

pub use counters::*;
pub use error::*;
pub use geocode::{ReverseGeocode, ReverseGeocodeRequest};

// crates.io
use axum::{
	Json, Router,
	body::Bytes,
	extract::{Request, State},
	http::{HeaderMap, StatusCode},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;
// self
use crate::{
	_prelude::*,
	auth::{BearerSessionVerifier, Session, SessionVerifier},
	config::Settings,
	error::ConfigError,
	http::{ApiClient, Relayed},
	obs::{CallKind, CallSpan},
	webhook::{LoggingWebhookHandler, WebhookHandler},
};

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
	settings: Settings,
	backend_url: Url,
	geocoding_url: Url,
	http: ReqwestClient,
	sessions: Arc<dyn SessionVerifier>,
	webhooks: Arc<dyn WebhookHandler>,
	metrics: Arc<ProxyMetrics>,
}
impl AppState {
	/// Resolves base URLs once from `settings` and installs default collaborators.
	pub fn new(settings: Settings) -> Result<Self, ConfigError> {
		Ok(Self {
			backend_url: settings.backend_base_url()?,
			geocoding_url: settings.geocoding_base_url()?,
			settings,
			http: ReqwestClient::builder().build()?,
			sessions: Arc::new(BearerSessionVerifier::default()),
			webhooks: Arc::new(LoggingWebhookHandler),
			metrics: Default::default(),
		})
	}

	/// Replaces the outbound reqwest pool.
	pub fn with_http_client(mut self, http: ReqwestClient) -> Self {
		self.http = http;

		self
	}

	/// Replaces the session verifier.
	pub fn with_session_verifier(mut self, sessions: Arc<dyn SessionVerifier>) -> Self {
		self.sessions = sessions;

		self
	}

	/// Replaces the webhook event handler.
	pub fn with_webhook_handler(mut self, webhooks: Arc<dyn WebhookHandler>) -> Self {
		self.webhooks = webhooks;

		self
	}

	/// Shares an existing counter set.
	pub fn with_metrics(mut self, metrics: Arc<ProxyMetrics>) -> Self {
		self.metrics = metrics;

		self
	}

	/// Counters for this router.
	pub fn metrics(&self) -> &Arc<ProxyMetrics> {
		&self.metrics
	}

	/// Configuration view; secrets are read through it per request.
	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	/// Backend base URL resolved at construction.
	pub fn backend_url(&self) -> &Url {
		&self.backend_url
	}

	async fn session(&self, headers: &HeaderMap) -> Result<Session, ProxyError> {
		match self.sessions.verify(headers).await {
			Some(session) => Ok(session),
			None => Err(ProxyError::Unauthorized),
		}
	}

	/// Session whose token the backend has accepted; routes that never reach the backend
	/// themselves use this instead of trusting the unsigned claims.
	async fn confirmed_session(&self, headers: &HeaderMap) -> Result<Session, ProxyError> {
		let session = self.session(headers).await?;

		self.metrics.record_upstream_call();

		match self.backend(&session).me().await {
			Ok(_) => Ok(session),
			Err(ApiError::Http { status: 401 | 403, .. }) => {
				tracing::warn!(user = %session.user_id, "backend rejected bearer token");

				Err(ProxyError::Unauthorized)
			},
			Err(e) => Err(e.into()),
		}
	}

	fn backend(&self, session: &Session) -> ApiClient {
		ApiClient::for_session(self.http.clone(), self.backend_url.clone(), session)
	}

	fn public_backend(&self) -> ApiClient {
		ApiClient::with_http_client(self.http.clone(), self.backend_url.clone(), None, None)
	}

	/// One relayed backend call on behalf of `session`.
	async fn relay(
		&self,
		session: &Session,
		method: Method,
		path: &str,
		body: Option<&Value>,
	) -> Result<Relayed, ProxyError> {
		self.metrics.record_upstream_call();

		Ok(self.backend(session).relay(method, path, body).await?)
	}
}
impl Debug for AppState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AppState")
			.field("backend_url", &self.backend_url.as_str())
			.field("geocoding_url", &self.geocoding_url.as_str())
			.finish_non_exhaustive()
	}
}

/// Builds the gateway router over `state`.
pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/healthz", get(status::healthz))
		.route("/api/maps/config", get(status::maps_config))
		.route("/api/mapbox/reverse", post(geocode::reverse))
		.route("/api/contact", post(contact::submit))
		.route("/api/providers/me", get(provider::show).put(provider::update))
		.route("/api/providers/me/hero-image/upload-url", post(provider::hero_upload_url))
		.route("/api/providers/me/hero-image/confirm", post(provider::hero_confirm))
		.route("/api/upload", put(upload::put_object))
		.route("/api/reviews", post(reviews::create))
		.route("/api/reviews/{id}", delete(reviews::remove))
		.route("/api/bookmarks", get(bookmarks::list).post(bookmarks::create))
		.route("/api/bookmarks/{provider_id}", delete(bookmarks::remove))
		.route("/api/webhooks/identity", post(webhook::receive))
		.fallback(not_found)
		.layer(middleware::from_fn_with_state(state.clone(), track))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

async fn track(State(state): State<AppState>, request: Request, next: Next) -> Response {
	let path = request.uri().path().to_owned();

	state.metrics.record_request();

	let response = CallSpan::new(CallKind::Route, "proxy").instrument(next.run(request)).await;
	let status = response.status();

	if status.is_client_error() {
		state.metrics.record_rejection();
	} else if status.is_server_error() {
		state.metrics.record_failure();
		tracing::warn!(%path, status = status.as_u16(), "proxy route failed");
	}

	response
}

async fn not_found() -> ProxyError {
	ProxyError::NotFound { message: "Route not found".into() }
}

/// Decodes a required JSON body; any decode failure is the caller's fault.
fn json_body<T>(bytes: &Bytes) -> Result<T, ProxyError>
where
	T: DeserializeOwned,
{
	if bytes.iter().all(u8::is_ascii_whitespace) {
		return Err(ProxyError::bad_request("Request body is required"));
	}

	serde_json::from_slice(bytes)
		.map_err(|e| ProxyError::bad_request(format!("Invalid request body: {e}")))
}

/// Decodes an optional JSON body; empty or non-JSON bodies count as absent.
fn optional_json(bytes: &Bytes) -> Option<Value> {
	serde_json::from_slice::<Value>(bytes).ok().filter(|value| !value.is_null())
}

fn relayed(relayed: Relayed) -> Response {
	let status = StatusCode::from_u16(relayed.status).unwrap_or(StatusCode::OK);

	if status == StatusCode::NO_CONTENT {
		return status.into_response();
	}

	(status, Json(relayed.body)).into_response()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn optional_bodies_ignore_non_json() {
		assert!(optional_json(&Bytes::from_static(b"")).is_none());
		assert!(optional_json(&Bytes::from_static(b"file=hero.png")).is_none());
		assert_eq!(
			optional_json(&Bytes::from_static(br#"{"content_type":"image/png"}"#)),
			Some(serde_json::json!({ "content_type": "image/png" }))
		);
	}

	#[test]
	fn required_bodies_report_missing_fields() {
		#[derive(Debug, Deserialize)]
		struct Body {
			#[allow(dead_code)]
			object_key: String,
		}

		let err = json_body::<Body>(&Bytes::from_static(b"{}"))
			.expect_err("Missing field should fail.");

		assert!(matches!(
			err,
			ProxyError::BadRequest { ref message } if message.contains("object_key")
		));
		assert!(json_body::<Body>(&Bytes::new()).is_err());
	}
}
