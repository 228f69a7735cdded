// self
use crate::{
	_prelude::*,
	api::{
		Bookmark, Category, Provider, ProviderFilter, ProviderPage, Review, SearchParams,
		UserProfile,
	},
	auth::ProviderId,
	hooks::Hooks,
	query::{QueryKey, QueryState},
};

impl Hooks {
	/// One provider listing.
	pub async fn provider(&self, id: ProviderId) -> QueryState<Provider> {
		let fetch = self.fetcher(move |client| async move { client.provider(id).await });

		self.queries.fetch(QueryKey::provider(id), self.queries.options(), fetch).await
	}

	/// Filtered provider page.
	pub async fn providers(&self, filter: ProviderFilter) -> QueryState<ProviderPage> {
		let key = QueryKey::providers(filter.query_pairs());
		let filter = Arc::new(filter);
		let fetch = self.fetcher(move |client| {
			let filter = filter.clone();

			async move { client.list_providers(&filter).await }
		});

		self.queries.fetch(key, self.queries.options(), fetch).await
	}

	/// Search results; an invalid search settles as an error without a network call.
	pub async fn search_providers(&self, params: SearchParams) -> QueryState<ProviderPage> {
		let key = QueryKey::search(params.query_pairs());
		let params = Arc::new(params);
		let fetch = self.fetcher(move |client| {
			let params = params.clone();

			async move { client.search_providers(&params).await }
		});

		self.queries.fetch(key, self.queries.options(), fetch).await
	}

	/// All listing categories.
	pub async fn categories(&self) -> QueryState<Vec<Category>> {
		let fetch = self.fetcher(|client| async move { client.categories().await });

		self.queries.fetch(QueryKey::categories(), self.queries.options(), fetch).await
	}

	/// Reviews of one provider.
	pub async fn provider_reviews(&self, id: ProviderId) -> QueryState<Vec<Review>> {
		let fetch = self.fetcher(move |client| async move { client.provider_reviews(id).await });

		self.queries.fetch(QueryKey::provider_reviews(id), self.queries.options(), fetch).await
	}

	/// The signed-in user's reviews.
	pub async fn user_reviews(&self) -> QueryState<Vec<Review>> {
		let Some(user) = self.current_user().await else {
			return QueryState::idle();
		};
		let fetch = self.fetcher(|client| async move { client.my_reviews().await });

		self.queries.fetch(QueryKey::user_reviews(&user), self.queries.options(), fetch).await
	}

	/// The signed-in user's bookmarks.
	pub async fn bookmarks(&self) -> QueryState<Vec<Bookmark>> {
		let Some(user) = self.current_user().await else {
			return QueryState::idle();
		};
		let fetch = self.fetcher(|client| async move { client.bookmarks().await });

		self.queries.fetch(QueryKey::bookmarks(&user), self.queries.options(), fetch).await
	}

	/// Whether the signed-in user bookmarked `provider`.
	pub async fn is_bookmarked(&self, provider: ProviderId) -> QueryState<bool> {
		let Some(user) = self.current_user().await else {
			return QueryState::idle();
		};
		let fetch = self.fetcher(move |client| async move { client.is_bookmarked(provider).await });

		self.queries
			.fetch(QueryKey::bookmark_status(&user, provider), self.queries.options(), fetch)
			.await
	}

	/// The signed-in user's profile.
	pub async fn user_profile(&self) -> QueryState<UserProfile> {
		let Some(user) = self.current_user().await else {
			return QueryState::idle();
		};
		let fetch = self.fetcher(|client| async move { client.me().await });

		self.queries.fetch(QueryKey::user_profile(&user), self.queries.options(), fetch).await
	}

	/// The listing owned by the signed-in user.
	pub async fn my_provider(&self) -> QueryState<Provider> {
		let Some(user) = self.current_user().await else {
			return QueryState::idle();
		};
		let fetch = self.fetcher(|client| async move { client.my_provider().await });

		self.queries.fetch(QueryKey::my_provider(&user), self.queries.options(), fetch).await
	}
}
