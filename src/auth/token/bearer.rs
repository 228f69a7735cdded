//! Bearer credential as it travels between the browser, the gateway and the backend.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
// self
use crate::_prelude::*;

/// Identity-provider session JWT; never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);
impl BearerToken {
	/// Wraps a raw token as issued by the identity provider.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Extracts the token from an `Authorization: Bearer <token>` header.
	///
	/// The scheme is matched case-insensitively; other schemes and empty tokens yield `None`.
	pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
		let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
		let (scheme, token) = value.split_once(' ')?;
		let token = token.trim();

		(scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| Self::new(token))
	}

	/// Raw token text for code that has to forward it.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Decodes the JWT payload segment without checking the signature.
	///
	/// Only the backend can vouch for the token; callers use the claims for routing and
	/// expiry hints.
	pub fn claims<T>(&self) -> Option<T>
	where
		T: DeserializeOwned,
	{
		let mut segments = self.0.split('.');
		let (_header, payload, _signature) = (segments.next()?, segments.next()?, segments.next()?);

		if segments.next().is_some() {
			return None;
		}

		let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;

		serde_json::from_slice(&bytes).ok()
	}

	/// `Authorization` header value, flagged sensitive so HTTP tracing masks it.
	pub fn authorization(&self) -> Result<HeaderValue, ApiError> {
		let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0))
			.map_err(|_| ApiError::invalid("bearer token is not a valid header value"))?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl Debug for BearerToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "BearerToken({} bytes)", self.0.len())
	}
}
