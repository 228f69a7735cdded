//! Identity-provider webhook verification (`svix-id`, `svix-timestamp`, `svix-signature`).
//!
//! The signed content is `"{id}.{timestamp}.{payload}"`, MAC'd with HMAC-SHA256 under the
//! base64 secret that follows the optional `whsec_` prefix. `svix-signature` carries a
//! space-separated list of `v1,<base64>` entries; one match is enough.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use reqwest::header::HeaderMap;
use sha2::Sha256;
// self
use crate::_prelude::*;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the message id.
pub const HEADER_ID: &str = "svix-id";
/// Header carrying the unix timestamp (seconds).
pub const HEADER_TIMESTAMP: &str = "svix-timestamp";
/// Header carrying the signature list.
pub const HEADER_SIGNATURE: &str = "svix-signature";

const SECRET_PREFIX: &str = "whsec_";
const SIGNATURE_VERSION: &str = "v1";

/// Boxed future returned by [`WebhookHandler::handle`].
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), WebhookError>> + 'a + Send>>;

/// Reasons a delivery is rejected or could not be processed.
#[derive(Debug, ThisError)]
pub enum WebhookError {
	/// A required `svix-*` header is absent or not visible ASCII.
	#[error("Webhook header `{name}` is missing.")]
	MissingHeader {
		/// Header name.
		name: &'static str,
	},
	/// `svix-timestamp` is not an integer.
	#[error("Webhook timestamp is not a unix timestamp.")]
	InvalidTimestamp,
	/// `svix-timestamp` is outside the tolerance window.
	#[error("Webhook timestamp is outside the accepted window.")]
	StaleTimestamp,
	/// No signature entry matched.
	#[error("Webhook signature does not match.")]
	InvalidSignature,
	/// The configured secret is not valid base64.
	#[error("Webhook secret is malformed.")]
	InvalidSecret,
	/// The payload is not a JSON event envelope.
	#[error("Webhook payload could not be decoded.")]
	Payload {
		/// Decoder failure.
		#[source]
		source: serde_json::Error,
	},
	/// The injected handler failed after verification.
	#[error("Webhook handler failed: {cause}.")]
	Handler {
		/// Handler-provided description.
		cause: String,
	},
}
impl WebhookError {
	/// Returns `true` for failures attributable to the sender (bad headers, signature, body).
	pub fn is_rejection(&self) -> bool {
		!matches!(self, Self::InvalidSecret | Self::Handler { .. })
	}
}

/// The three `svix-*` headers of one delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookHeaders {
	/// Message id.
	pub id: String,
	/// Unix timestamp (seconds), as sent.
	pub timestamp: String,
	/// Space-separated signature list.
	pub signature: String,
}
impl WebhookHeaders {
	/// Extracts the header triple.
	pub fn from_header_map(headers: &HeaderMap) -> Result<Self, WebhookError> {
		let read = |name: &'static str| {
			headers
				.get(name)
				.and_then(|value| value.to_str().ok())
				.map(str::trim)
				.filter(|value| !value.is_empty())
				.map(str::to_owned)
				.ok_or(WebhookError::MissingHeader { name })
		};

		Ok(Self {
			id: read(HEADER_ID)?,
			timestamp: read(HEADER_TIMESTAMP)?,
			signature: read(HEADER_SIGNATURE)?,
		})
	}
}

/// Verifies deliveries signed with one shared secret.
#[derive(Clone)]
pub struct WebhookVerifier {
	key: Vec<u8>,
	tolerance: Duration,
}
impl WebhookVerifier {
	const DEFAULT_TOLERANCE: Duration = Duration::minutes(5);

	/// Decodes `secret` (`whsec_` prefix optional).
	pub fn new(secret: &str) -> Result<Self, WebhookError> {
		let encoded = secret.trim();
		let encoded = encoded.strip_prefix(SECRET_PREFIX).unwrap_or(encoded);
		let key = STANDARD.decode(encoded).map_err(|_| WebhookError::InvalidSecret)?;

		if key.is_empty() {
			return Err(WebhookError::InvalidSecret);
		}

		Ok(Self { key, tolerance: Self::DEFAULT_TOLERANCE })
	}

	/// Overrides the timestamp tolerance (defaults to 5 minutes).
	pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
		self.tolerance = tolerance.abs();

		self
	}

	/// Produces the `v1,<base64>` entry for a delivery.
	pub fn sign(&self, id: &str, timestamp: i64, payload: &[u8]) -> Result<String, WebhookError> {
		let mac = self.mac(id, &timestamp.to_string(), payload)?;

		Ok(format!("{SIGNATURE_VERSION},{}", STANDARD.encode(mac.finalize().into_bytes())))
	}

	/// Verifies against the current clock.
	pub fn verify(&self, headers: &WebhookHeaders, payload: &[u8]) -> Result<(), WebhookError> {
		self.verify_at(headers, payload, OffsetDateTime::now_utc())
	}

	/// Verifies against `now`.
	pub fn verify_at(
		&self,
		headers: &WebhookHeaders,
		payload: &[u8],
		now: OffsetDateTime,
	) -> Result<(), WebhookError> {
		let sent = headers.timestamp.parse::<i64>().map_err(|_| WebhookError::InvalidTimestamp)?;
		let sent =
			OffsetDateTime::from_unix_timestamp(sent).map_err(|_| WebhookError::InvalidTimestamp)?;

		if (now - sent).abs() > self.tolerance {
			return Err(WebhookError::StaleTimestamp);
		}

		let mac = self.mac(&headers.id, &headers.timestamp, payload)?;
		let matched = headers
			.signature
			.split_whitespace()
			.filter_map(|entry| entry.split_once(','))
			.filter(|(version, _)| *version == SIGNATURE_VERSION)
			.filter_map(|(_, sig)| STANDARD.decode(sig).ok())
			.any(|sig| mac.clone().verify_slice(&sig).is_ok());

		if matched { Ok(()) } else { Err(WebhookError::InvalidSignature) }
	}

	fn mac(&self, id: &str, timestamp: &str, payload: &[u8]) -> Result<HmacSha256, WebhookError> {
		let mut mac =
			HmacSha256::new_from_slice(&self.key).map_err(|_| WebhookError::InvalidSecret)?;

		mac.update(id.as_bytes());
		mac.update(b".");
		mac.update(timestamp.as_bytes());
		mac.update(b".");
		mac.update(payload);

		Ok(mac)
	}
}
impl Debug for WebhookVerifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("WebhookVerifier")
			.field("tolerance", &self.tolerance)
			.finish_non_exhaustive()
	}
}

/// Identity events the gateway reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdentityEventKind {
	/// `user.created`
	UserCreated,
	/// `user.updated`
	UserUpdated,
	/// `session.created`
	SessionCreated,
	/// `session.revoked`
	SessionRevoked,
	/// Any other type; acknowledged and ignored.
	Other,
}

/// Verified event envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
	/// Event type, e.g. `user.created`.
	#[serde(rename = "type")]
	pub event_type: String,
	/// Event object.
	#[serde(default)]
	pub data: Value,
}
impl WebhookEvent {
	/// Decodes a verified payload.
	pub fn parse(payload: &[u8]) -> Result<Self, WebhookError> {
		serde_json::from_slice(payload).map_err(|source| WebhookError::Payload { source })
	}

	/// Classifies the event type.
	pub fn kind(&self) -> IdentityEventKind {
		match self.event_type.as_str() {
			"user.created" => IdentityEventKind::UserCreated,
			"user.updated" => IdentityEventKind::UserUpdated,
			"session.created" => IdentityEventKind::SessionCreated,
			"session.revoked" => IdentityEventKind::SessionRevoked,
			_ => IdentityEventKind::Other,
		}
	}

	/// `data.id`, when present.
	pub fn subject_id(&self) -> Option<&str> {
		self.data.get("id").and_then(Value::as_str)
	}
}

/// Receives verified events of a known kind.
pub trait WebhookHandler
where
	Self: Send + Sync,
{
	/// Handles one event; an error turns into a 500 for the sender to retry.
	fn handle<'a>(&'a self, kind: IdentityEventKind, event: &'a WebhookEvent) -> HandlerFuture<'a>;
}

/// Default handler that logs each event.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingWebhookHandler;
impl WebhookHandler for LoggingWebhookHandler {
	fn handle<'a>(&'a self, kind: IdentityEventKind, event: &'a WebhookEvent) -> HandlerFuture<'a> {
		tracing::info!(
			event_type = %event.event_type,
			?kind,
			subject = ?event.subject_id(),
			"identity event received"
		);

		Box::pin(async { Ok(()) })
	}
}

/// Verifies, decodes, and dispatches one delivery.
///
/// Returns the event kind; `Other` events are acknowledged without calling `handler`.
pub async fn process(
	verifier: &WebhookVerifier,
	handler: &dyn WebhookHandler,
	headers: &HeaderMap,
	payload: &[u8],
) -> Result<IdentityEventKind, WebhookError> {
	let delivery = WebhookHeaders::from_header_map(headers)?;

	verifier.verify(&delivery, payload)?;

	let event = WebhookEvent::parse(payload)?;
	let kind = event.kind();

	if kind == IdentityEventKind::Other {
		tracing::debug!(event_type = %event.event_type, "ignoring unhandled identity event");

		return Ok(kind);
	}

	handler.handle(kind, &event).await?;

	Ok(kind)
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// crates.io
	use reqwest::header::HeaderValue;
	// self
	use super::*;

	const SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";

	#[derive(Default)]
	struct Counting(AtomicUsize);
	impl WebhookHandler for Counting {
		fn handle<'a>(&'a self, _: IdentityEventKind, _: &'a WebhookEvent) -> HandlerFuture<'a> {
			self.0.fetch_add(1, Ordering::SeqCst);

			Box::pin(async { Ok(()) })
		}
	}

	fn headers(verifier: &WebhookVerifier, ts: i64, payload: &[u8]) -> HeaderMap {
		let signature = verifier.sign("msg_1", ts, payload).expect("Signing should succeed.");
		let mut headers = HeaderMap::new();

		headers.insert(HEADER_ID, HeaderValue::from_static("msg_1"));
		headers.insert(
			HEADER_TIMESTAMP,
			HeaderValue::from_str(&ts.to_string()).expect("Timestamp should be a valid header."),
		);
		headers.insert(
			HEADER_SIGNATURE,
			HeaderValue::from_str(&format!("v1,bm90LWl0 {signature}"))
				.expect("Signature should be a valid header."),
		);

		headers
	}

	#[test]
	fn signature_round_trips_with_prefix_optional() {
		let verifier = WebhookVerifier::new(SECRET).expect("Secret fixture should decode.");
		let bare = WebhookVerifier::new(SECRET.trim_start_matches("whsec_"))
			.expect("Unprefixed secret should decode.");
		let now = OffsetDateTime::now_utc();
		let delivery = WebhookHeaders {
			id: "msg_1".into(),
			timestamp: now.unix_timestamp().to_string(),
			signature: verifier
				.sign("msg_1", now.unix_timestamp(), b"{}")
				.expect("Signing should succeed."),
		};

		assert!(bare.verify_at(&delivery, b"{}", now).is_ok());
		assert!(matches!(
			verifier.verify_at(&delivery, b"{ }", now),
			Err(WebhookError::InvalidSignature)
		));
	}

	#[test]
	fn stale_timestamps_are_rejected() {
		let verifier = WebhookVerifier::new(SECRET).expect("Secret fixture should decode.");
		let now = OffsetDateTime::now_utc();
		let sent = now - Duration::minutes(6);
		let delivery = WebhookHeaders {
			id: "msg_1".into(),
			timestamp: sent.unix_timestamp().to_string(),
			signature: verifier
				.sign("msg_1", sent.unix_timestamp(), b"{}")
				.expect("Signing should succeed."),
		};

		assert!(matches!(
			verifier.verify_at(&delivery, b"{}", now),
			Err(WebhookError::StaleTimestamp)
		));
	}

	#[tokio::test]
	async fn wrong_secret_never_reaches_handler() {
		let signer = WebhookVerifier::new("whsec_c29tZS1vdGhlci1zZWNyZXQ=")
			.expect("Other secret should decode.");
		let verifier = WebhookVerifier::new(SECRET).expect("Secret fixture should decode.");
		let handler = Counting::default();
		let payload = br#"{"type":"user.created","data":{"id":"user_1"}}"#;
		let headers = headers(&signer, OffsetDateTime::now_utc().unix_timestamp(), payload);
		let err = process(&verifier, &handler, &headers, payload)
			.await
			.expect_err("Foreign signature should be rejected.");

		assert!(matches!(err, WebhookError::InvalidSignature));
		assert!(err.is_rejection());
		assert_eq!(handler.0.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn known_events_dispatch_and_unknown_are_acknowledged() {
		let verifier = WebhookVerifier::new(SECRET).expect("Secret fixture should decode.");
		let handler = Counting::default();
		let now = OffsetDateTime::now_utc().unix_timestamp();
		let created = br#"{"type":"user.created","data":{"id":"user_1"}}"#;
		let other = br#"{"type":"email.created","data":{}}"#;

		assert_eq!(
			process(&verifier, &handler, &headers(&verifier, now, created), created)
				.await
				.expect("Signed event should be accepted."),
			IdentityEventKind::UserCreated
		);
		assert_eq!(
			process(&verifier, &handler, &headers(&verifier, now, other), other)
				.await
				.expect("Unknown event should be acknowledged."),
			IdentityEventKind::Other
		);
		assert_eq!(handler.0.load(Ordering::SeqCst), 1);
		assert!(matches!(
			WebhookHeaders::from_header_map(&HeaderMap::new()),
			Err(WebhookError::MissingHeader { name: HEADER_ID })
		));
	}
}
