// crates.io
use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};
// self
use crate::_prelude::*;

/// Route-boundary failure, rendered as `{"error": "…"}`.
#[derive(Debug, ThisError)]
pub enum ProxyError {
	/// Caller input is missing or malformed (400).
	#[error("{message}")]
	BadRequest {
		/// Client-facing description.
		message: String,
	},
	/// The route needs a session and the request carried none (401).
	#[error("Unauthorized")]
	Unauthorized,
	/// Nothing to return (404).
	#[error("{message}")]
	NotFound {
		/// Client-facing description.
		message: String,
	},
	/// Upstream answered non-2xx; its status and message are relayed.
	#[error("{message}")]
	Upstream {
		/// Upstream status.
		status: u16,
		/// Message extracted from the upstream body.
		message: String,
	},
	/// Upstream could not be reached (503).
	#[error("Service unavailable")]
	Unavailable,
	/// A required server-side setting is absent (500).
	#[error("{what} is not configured")]
	Misconfigured {
		/// Name of the missing capability.
		what: &'static str,
	},
	/// Anything else (500); the cause is logged, never returned.
	#[error("Internal server error")]
	Internal {
		/// Server-side description.
		cause: String,
	},
}
impl ProxyError {
	/// Builds a 400.
	pub fn bad_request(message: impl Into<String>) -> Self {
		Self::BadRequest { message: message.into() }
	}

	/// Builds a 500 whose cause stays server-side.
	pub fn internal(cause: impl Display) -> Self {
		Self::Internal { cause: cause.to_string() }
	}

	/// HTTP status of the rendered response.
	pub fn status(&self) -> StatusCode {
		match self {
			Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
			Self::Unauthorized => StatusCode::UNAUTHORIZED,
			Self::NotFound { .. } => StatusCode::NOT_FOUND,
			Self::Upstream { status, .. } =>
				StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
			Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
			Self::Misconfigured { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}
impl From<ApiError> for ProxyError {
	fn from(e: ApiError) -> Self {
		match e {
			ApiError::Http { status, message, .. } => Self::Upstream { status, message },
			ApiError::Network { source } => {
				tracing::warn!(error = %source, "upstream unreachable");

				Self::Unavailable
			},
			ApiError::Unauthenticated => Self::Unauthorized,
			ApiError::Invalid { reason } => Self::BadRequest { message: reason },
			e @ (ApiError::Decode { .. } | ApiError::Unknown { .. }) => Self::internal(e),
		}
	}
}
impl IntoResponse for ProxyError {
	fn into_response(self) -> Response {
		if let Self::Internal { cause } = &self {
			tracing::error!(%cause, "proxy route failed unexpectedly");
		}

		let status = self.status();

		(status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
	}
}
