//! Gateway-level error types shared across the client, cache, and proxy layers.

// self
use crate::_prelude::*;

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;
type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Outbound call failed.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Webhook delivery could not be verified or decoded.
	#[error(transparent)]
	Webhook(#[from] crate::webhook::WebhookError),
	/// Underlying IO failure (listener bind, accept loop).
	#[error("I/O error occurred while running the gateway.")]
	Io(#[from] std::io::Error),
}

/// Configuration and validation failures raised while wiring the gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A required configuration key is absent or empty.
	#[error("Configuration key `{key}` is not set.")]
	Missing {
		/// Environment key that was looked up.
		key: &'static str,
	},
	/// A configuration value that must be a URL failed to parse.
	#[error("Configuration key `{key}` does not hold a valid URL.")]
	InvalidUrl {
		/// Environment key that was looked up.
		key: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The listener address could not be parsed.
	#[error("Bind address `{value}` is invalid.")]
	InvalidBindAddr {
		/// Raw configured value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: std::net::AddrParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Tagged outcome of an outbound call that did not yield a usable payload.
///
/// Values are cheap to clone so the query cache can hand the same failure to every
/// caller waiting on a key.
#[derive(Clone, Debug, ThisError)]
pub enum ApiError {
	/// Upstream answered with a non-2xx status.
	#[error("Upstream responded with HTTP {status}: {message}.")]
	Http {
		/// HTTP status code returned by the upstream.
		status: u16,
		/// Best-effort message extracted from the upstream body.
		message: String,
		/// Parsed upstream body, when it was JSON.
		body: Option<Value>,
	},
	/// Upstream could not be reached (DNS, connect, timeout, broken body stream).
	#[error("Upstream could not be reached.")]
	Network {
		/// Transport-specific failure.
		#[source]
		source: SharedError,
	},
	/// The call needs a bearer token and none was available.
	#[error("Request requires an authenticated session.")]
	Unauthenticated,
	/// Caller-side input was rejected before any network call.
	#[error("Request is invalid: {reason}.")]
	Invalid {
		/// Human-readable validation failure.
		reason: String,
	},
	/// A 2xx payload did not match the expected shape.
	#[error("Upstream payload could not be decoded at `{path}`: {message}.")]
	Decode {
		/// JSON path where decoding stopped.
		path: String,
		/// Decoder message.
		message: String,
		/// HTTP status of the response being decoded.
		status: u16,
	},
	/// Anything else; the cause is kept for server-side logs only.
	#[error("Unexpected failure: {cause}.")]
	Unknown {
		/// Description of the underlying failure.
		cause: String,
	},
}
impl ApiError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Arc::new(src) }
	}

	/// Builds a validation failure.
	pub fn invalid(reason: impl Into<String>) -> Self {
		Self::Invalid { reason: reason.into() }
	}

	/// Builds an [`ApiError::Http`] from a raw upstream body.
	pub fn from_response(status: u16, body: &[u8]) -> Self {
		let parsed = serde_json::from_slice::<Value>(body).ok();
		let message = parsed
			.as_ref()
			.and_then(extract_message)
			.or_else(|| {
				let text = String::from_utf8_lossy(body);
				let text = text.trim();

				(!text.is_empty() && text.len() <= 200 && !text.starts_with('<'))
					.then(|| text.to_owned())
			})
			.unwrap_or_else(|| canonical_reason(status).to_owned());

		Self::Http { status, message, body: parsed }
	}

	/// HTTP status attached to the failure, when there was a response.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Http { status, .. } | Self::Decode { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Returns `true` when a read may be attempted again.
	///
	/// Network failures, 5xx, 408, and 429 are retryable; every other client error is final.
	pub fn is_retryable(&self) -> bool {
		match self {
			Self::Network { .. } => true,
			Self::Http { status, .. } => *status >= 500 || matches!(status, 408 | 429),
			_ => false,
		}
	}
}
impl From<ReqwestError> for ApiError {
	fn from(e: ReqwestError) -> Self {
		if e.is_connect() || e.is_timeout() || e.is_request() || e.is_body() {
			Self::network(e)
		} else {
			Self::Unknown { cause: e.to_string() }
		}
	}
}

/// Pulls a human-readable message out of an upstream JSON error body.
///
/// Looks at `error`, `message`, and `detail` (strings), then `error.message`, then
/// `errors[0].message`.
pub fn extract_message(body: &Value) -> Option<String> {
	for field in ["error", "message", "detail"] {
		if let Some(text) = body.get(field).and_then(Value::as_str) {
			let text = text.trim();

			if !text.is_empty() {
				return Some(text.to_owned());
			}
		}
	}

	body.get("error")
		.and_then(|error| error.get("message"))
		.or_else(|| body.get("errors").and_then(|errors| errors.get(0)?.get("message")))
		.and_then(Value::as_str)
		.map(str::to_owned)
}

fn canonical_reason(status: u16) -> &'static str {
	reqwest::StatusCode::from_u16(status)
		.ok()
		.and_then(|code| code.canonical_reason())
		.unwrap_or("Upstream request failed")
}
