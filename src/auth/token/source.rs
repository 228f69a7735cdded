//! Token sources: the seam between the gateway and the identity provider's SDK.
//!
//! A [`TokenSource`] is asked for a token at the start of every outbound call. Sources must
//! not hand back a token cached from an earlier request unless the identity provider itself
//! vouches that it is still current; renewal is the provider's business, not the gateway's.

// self
use crate::{
	_prelude::*,
	auth::{id::UserId, token::bearer::BearerToken},
};

/// Boxed future returned by [`TokenSource::fetch_current_token`].
pub type TokenFuture<'a> = Pin<Box<dyn Future<Output = Option<Token>> + 'a + Send>>;

/// Capability that yields the current bearer token, if the caller is signed in.
pub trait TokenSource
where
	Self: Send + Sync,
{
	/// Fetches the token to attach to the call that is about to start.
	fn fetch_current_token(&self) -> TokenFuture<'_>;
}

/// Bearer token paired with the user it was issued to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
	/// Credential for the `Authorization` header.
	pub value: BearerToken,
	/// Stable user identifier.
	pub user_id: UserId,
}
impl Token {
	/// Pairs a token value with its user.
	pub fn new(value: impl Into<String>, user_id: UserId) -> Self {
		Self { value: BearerToken::new(value), user_id }
	}
}

/// Source for signed-out callers; always yields `None`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnonymousTokenSource;
impl TokenSource for AnonymousTokenSource {
	fn fetch_current_token(&self) -> TokenFuture<'_> {
		Box::pin(async { None })
	}
}

/// Source that always returns the same token; handy for service accounts and tests.
#[derive(Clone, Debug)]
pub struct StaticTokenSource(Token);
impl StaticTokenSource {
	/// Wraps a fixed token.
	pub fn new(token: Token) -> Self {
		Self(token)
	}
}
impl TokenSource for StaticTokenSource {
	fn fetch_current_token(&self) -> TokenFuture<'_> {
		let token = self.0.clone();

		Box::pin(async move { Some(token) })
	}
}

/// Adapts an async closure (typically an identity SDK call) into a [`TokenSource`].
pub struct FnTokenSource<F>(F);
impl<F, Fut> FnTokenSource<F>
where
	F: 'static + Send + Sync + Fn() -> Fut,
	Fut: 'static + Send + Future<Output = Option<Token>>,
{
	/// Wraps the closure.
	pub fn new(fetch: F) -> Self {
		Self(fetch)
	}
}
impl<F, Fut> TokenSource for FnTokenSource<F>
where
	F: 'static + Send + Sync + Fn() -> Fut,
	Fut: 'static + Send + Future<Output = Option<Token>>,
{
	fn fetch_current_token(&self) -> TokenFuture<'_> {
		Box::pin((self.0)())
	}
}
impl<F> Debug for FnTokenSource<F> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FnTokenSource(..)")
	}
}
