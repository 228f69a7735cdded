//! Server-side session checks for proxy routes.
//!
//! Proxy routes never trust a user id sent by the browser. They derive the `(token, user id)`
//! pair from the request's `Authorization` header through a [`SessionVerifier`] and forward
//! that same token to the backend, which performs the authoritative signature check.

// crates.io
use reqwest::header::HeaderMap;
// self
use crate::{
	_prelude::*,
	auth::{id::UserId, token::bearer::BearerToken},
};

/// Boxed future returned by [`SessionVerifier::verify`].
pub type SessionFuture<'a> = Pin<Box<dyn Future<Output = Option<Session>> + 'a + Send>>;

/// Request-scoped `(token, user id)` pair; never cached across requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
	/// Authenticated user.
	pub user_id: UserId,
	/// Token presented by the caller, forwarded verbatim upstream.
	pub token: BearerToken,
	/// Expiry advertised by the token, if any.
	pub expires_at: Option<OffsetDateTime>,
}

/// Derives a [`Session`] from inbound request headers.
pub trait SessionVerifier
where
	Self: Send + Sync,
{
	/// Returns the session carried by `headers`, or `None` when the caller is signed out.
	fn verify<'a>(&'a self, headers: &'a HeaderMap) -> SessionFuture<'a>;
}

#[derive(Deserialize)]
struct Claims {
	sub: String,
	#[serde(default)]
	exp: Option<i64>,
}

/// Reads the bearer token's JWT claim set (`sub`, `exp`) and rejects expired tokens.
#[derive(Clone, Debug)]
pub struct BearerSessionVerifier {
	leeway: Duration,
}
impl BearerSessionVerifier {
	const DEFAULT_LEEWAY: Duration = Duration::seconds(30);

	/// Overrides the clock-skew leeway applied to `exp` (defaults to 30 seconds).
	pub fn with_leeway(mut self, leeway: Duration) -> Self {
		self.leeway = if leeway.is_negative() { Duration::ZERO } else { leeway };

		self
	}

	/// Synchronous core of [`SessionVerifier::verify`], evaluated against `now`.
	pub fn session_at(&self, headers: &HeaderMap, now: OffsetDateTime) -> Option<Session> {
		let token = BearerToken::from_headers(headers)?;
		let claims = token.claims::<Claims>()?;
		let user_id = UserId::new(&claims.sub).ok()?;
		let expires_at = match claims.exp {
			Some(exp) => Some(OffsetDateTime::from_unix_timestamp(exp).ok()?),
			None => None,
		};

		if expires_at.is_some_and(|at| at + self.leeway < now) {
			tracing::debug!(user = %user_id, "rejecting expired bearer token");

			return None;
		}

		Some(Session { user_id, token, expires_at })
	}
}
impl Default for BearerSessionVerifier {
	fn default() -> Self {
		Self { leeway: Self::DEFAULT_LEEWAY }
	}
}
impl SessionVerifier for BearerSessionVerifier {
	fn verify<'a>(&'a self, headers: &'a HeaderMap) -> SessionFuture<'a> {
		let session = self.session_at(headers, OffsetDateTime::now_utc());

		Box::pin(async move { session })
	}
}
