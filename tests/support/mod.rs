#![allow(dead_code, unused_imports)]

// std
pub use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
pub use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
pub use httpmock::prelude::*;
pub use serde_json::{Value, json};
pub use time::{Duration, OffsetDateTime};
pub use url::Url;
// self
pub use marketplace_gateway::{
	auth::{
		AnonymousTokenSource, FnTokenSource, ProviderId, ReviewId, StaticTokenSource, Token,
		TokenSource, UserId,
	},
	config::{MapSource, Settings, keys},
	error::ApiError,
	http::{ApiClient, ApiClientFactory},
	proxy::{self, AppState, ProxyMetrics},
	query::{QueryClient, QueryKey, QueryOptions},
	webhook::{HandlerFuture, IdentityEventKind, WebhookEvent, WebhookHandler, WebhookVerifier},
};

pub const USER: &str = "user_test";
pub const WEBHOOK_SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";

pub fn user() -> UserId {
	UserId::new(USER).expect("Test user identifier should be valid.")
}

/// Unsigned JWT carrying `sub` and an `exp` one hour out.
pub fn jwt(sub: &str) -> String {
	let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
	let exp = OffsetDateTime::now_utc().unix_timestamp() + 3_600;
	let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": sub, "exp": exp }).to_string());

	format!("{header}.{payload}.test-signature")
}

pub fn base_url(server: &MockServer) -> Url {
	Url::parse(&server.url("/")).expect("Mock server URL should parse.")
}

/// Settings pointing the backend and geocoder at mock servers.
pub fn source(backend: &str, geocoder: &str) -> MapSource {
	MapSource::default()
		.with(keys::BACKEND_API_URL, backend)
		.with(keys::MAPBOX_API_URL, geocoder)
}

pub fn state(source: MapSource) -> AppState {
	AppState::new(Settings::new(source)).expect("Gateway state should build from test settings.")
}

/// Serves the router on an ephemeral port and returns its base URL.
pub async fn spawn_gateway(state: AppState) -> String {
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
		.await
		.expect("Ephemeral listener should bind.");
	let addr = listener.local_addr().expect("Listener should report its address.");

	tokio::spawn(async move {
		axum::serve(listener, proxy::router(state)).await.expect("Gateway should serve.");
	});

	format!("http://{addr}")
}

pub fn http() -> reqwest::Client {
	reqwest::Client::new()
}

pub fn factory(server: &MockServer) -> ApiClientFactory {
	ApiClientFactory::new(
		base_url(server),
		Arc::new(StaticTokenSource::new(Token::new(jwt(USER), user()))),
	)
}

/// Counts handled webhook events.
#[derive(Default)]
pub struct CountingHandler(pub AtomicUsize);
impl CountingHandler {
	pub fn count(&self) -> usize {
		self.0.load(Ordering::SeqCst)
	}
}
impl WebhookHandler for CountingHandler {
	fn handle<'a>(&'a self, _: IdentityEventKind, _: &'a WebhookEvent) -> HandlerFuture<'a> {
		self.0.fetch_add(1, Ordering::SeqCst);

		Box::pin(async { Ok(()) })
	}
}
