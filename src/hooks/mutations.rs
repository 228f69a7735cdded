// self
use crate::{
	_prelude::*,
	api::{
		Bookmark, HeroConfirm, HeroImage, HeroUploadRequest, NewReview, ProfileUpdate, Provider,
		ProviderUpdate, Review, ReviewUpdate, UserProfile,
	},
	auth::{ProviderId, ReviewId},
	hooks::Hooks,
	query::QueryKey,
};

impl Hooks {
	/// Posts a review; invalidates the provider's reviews and the user's reviews.
	pub async fn add_review(&self, review: NewReview) -> Result<Review, ApiError> {
		let (client, user) = self.authenticated().await?;
		let affected =
			[QueryKey::provider_reviews(review.provider_id), QueryKey::user_reviews(&user)];

		self.queries.mutate(&affected, client.create_review(&review)).await
	}

	/// Edits a review of `provider`; invalidates the same two keys as [`Hooks::add_review`].
	pub async fn update_review(
		&self,
		id: ReviewId,
		provider: ProviderId,
		update: ReviewUpdate,
	) -> Result<Review, ApiError> {
		let (client, user) = self.authenticated().await?;
		let affected = [QueryKey::provider_reviews(provider), QueryKey::user_reviews(&user)];

		self.queries.mutate(&affected, client.update_review(id, &update)).await
	}

	/// Deletes a review of `provider`; invalidates the same two keys as [`Hooks::add_review`].
	pub async fn delete_review(&self, id: ReviewId, provider: ProviderId) -> Result<(), ApiError> {
		let (client, user) = self.authenticated().await?;
		let affected = [QueryKey::provider_reviews(provider), QueryKey::user_reviews(&user)];

		self.queries.mutate(&affected, client.delete_review(id)).await
	}

	/// Bookmarks `provider`; marks it bookmarked and invalidates the bookmark list.
	pub async fn add_bookmark(&self, provider: ProviderId) -> Result<Bookmark, ApiError> {
		let (client, user) = self.authenticated().await?;
		let bookmark = self
			.queries
			.mutate(&[QueryKey::bookmarks(&user)], client.add_bookmark(provider))
			.await?;

		self.queries
			.set_query_data(&QueryKey::bookmark_status(&user, provider), |_: Option<bool>| true);

		Ok(bookmark)
	}

	/// Removes the bookmark on `provider`; marks it unbookmarked and invalidates the list.
	pub async fn remove_bookmark(&self, provider: ProviderId) -> Result<(), ApiError> {
		let (client, user) = self.authenticated().await?;

		self.queries.mutate(&[QueryKey::bookmarks(&user)], client.remove_bookmark(provider)).await?;
		self.queries
			.set_query_data(&QueryKey::bookmark_status(&user, provider), |_: Option<bool>| false);

		Ok(())
	}

	/// Updates the profile and writes the response into the cached profile.
	pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, ApiError> {
		let (client, user) = self.authenticated().await?;
		let profile = self.queries.mutate(&[], client.update_me(&update)).await?;
		let cached = profile.clone();

		self.queries
			.set_query_data(&QueryKey::user_profile(&user), move |_: Option<UserProfile>| cached);

		Ok(profile)
	}

	/// Updates the owned listing; patches `my_provider` and invalidates the public listing.
	pub async fn update_my_provider(&self, update: ProviderUpdate) -> Result<Provider, ApiError> {
		let (client, user) = self.authenticated().await?;
		let provider = self.queries.mutate(&[], client.update_my_provider(&update)).await?;
		let cached = provider.clone();

		self.queries.invalidate(&QueryKey::provider(provider.id));
		self.queries
			.set_query_data(&QueryKey::my_provider(&user), move |_: Option<Provider>| cached);

		Ok(provider)
	}

	/// Issues an upload URL, PUTs `bytes` to storage, then confirms the object key.
	///
	/// Invalidates `my_provider` once the confirmation succeeds. A failed step stops the
	/// sequence and leaves the cache untouched.
	pub async fn upload_hero_image(
		&self,
		content_type: &str,
		file_name: Option<String>,
		bytes: Vec<u8>,
	) -> Result<HeroImage, ApiError> {
		let (client, user) = self.authenticated().await?;
		let request = HeroUploadRequest { content_type: Some(content_type.to_owned()), file_name };
		let sequence = async {
			let ticket = client.request_hero_upload(&request).await?;

			client.upload_hero_bytes(&ticket, content_type, bytes).await?;

			let mut image = client
				.confirm_hero_upload(&HeroConfirm { object_key: ticket.object_key.clone() })
				.await?;

			if image.public_url.is_none() {
				image.public_url = ticket.public_url;
			}
			if image.object_key.is_none() {
				image.object_key = Some(ticket.object_key);
			}

			Ok::<_, ApiError>(image)
		};

		self.queries.mutate(&[QueryKey::my_provider(&user)], sequence).await
	}
}
