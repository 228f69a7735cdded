//! Typed hooks: one method per backend read or mutation, wired through the query cache.
//!
//! Reads return a [`QueryState`](crate::query::QueryState) and never fail outright; errors
//! land in the state. User-scoped reads stay `Idle` while signed out. Mutations return the
//! backend result directly and, on success, invalidate or patch the keys they affect.
//!
//! Every fetcher asks the [`ApiClientFactory`] for a new client when it runs, so background
//! refreshes carry a token fetched at refresh time rather than the one current when the
//! read was first issued.

mod mutations;
mod reads;

// self
use crate::{
	_prelude::*,
	auth::UserId,
	http::{ApiClient, ApiClientFactory},
	query::QueryClient,
};

type ApiFuture<T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send>>;

/// Hook surface shared by a signed-in (or anonymous) caller.
#[derive(Clone, Debug)]
pub struct Hooks {
	factory: ApiClientFactory,
	queries: QueryClient,
}
impl Hooks {
	/// Binds hooks to a client factory and a query cache.
	pub fn new(factory: ApiClientFactory, queries: QueryClient) -> Self {
		Self { factory, queries }
	}

	/// Underlying cache, for manual invalidation and inspection.
	pub fn queries(&self) -> &QueryClient {
		&self.queries
	}

	/// Underlying client factory.
	pub fn factory(&self) -> &ApiClientFactory {
		&self.factory
	}

	async fn current_user(&self) -> Option<UserId> {
		self.factory.client().await.user_id().cloned()
	}

	async fn authenticated(&self) -> Result<(ApiClient, UserId), ApiError> {
		let client = self.factory.client().await;
		let user = client.require_user()?.clone();

		Ok((client, user))
	}

	fn fetcher<T, C, Fut>(&self, call: C) -> impl 'static + Send + Sync + Fn() -> ApiFuture<T>
	where
		T: 'static,
		C: 'static + Send + Sync + Fn(ApiClient) -> Fut,
		Fut: 'static + Send + Future<Output = Result<T, ApiError>>,
	{
		let factory = self.factory.clone();
		let call = Arc::new(call);

		move || -> ApiFuture<T> {
			let factory = factory.clone();
			let call = call.clone();

			Box::pin(async move { call(factory.client().await).await })
		}
	}
}
