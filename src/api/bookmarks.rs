// self
use crate::{
	_prelude::*,
	api::models::{Bookmark, BookmarkWire, Listing},
	auth::ProviderId,
	http::ApiClient,
};

/// Body of `POST /bookmarks`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBookmark {
	/// Provider to bookmark.
	pub provider_id: ProviderId,
}

impl ApiClient {
	/// `GET /bookmarks`; entries that name no provider are dropped.
	pub async fn bookmarks(&self) -> Result<Vec<Bookmark>, ApiError> {
		self.require_user()?;

		let listing: Listing<BookmarkWire> = self.get("bookmarks", &[]).await?;
		let total = listing_len(&listing);
		let bookmarks =
			listing.into_vec().into_iter().filter_map(Bookmark::from_wire).collect::<Vec<_>>();

		if bookmarks.len() != total {
			tracing::warn!(
				dropped = total - bookmarks.len(),
				"bookmarks without a provider id were skipped"
			);
		}

		Ok(bookmarks)
	}

	/// Whether `provider` appears in the user's bookmark list.
	pub async fn is_bookmarked(&self, provider: ProviderId) -> Result<bool, ApiError> {
		Ok(self.bookmarks().await?.iter().any(|b| b.provider_id == provider))
	}

	/// `POST /bookmarks`
	pub async fn add_bookmark(&self, provider: ProviderId) -> Result<Bookmark, ApiError> {
		self.require_user()?;

		let mut wire: BookmarkWire =
			self.post("bookmarks", &NewBookmark { provider_id: provider }).await?;

		wire.provider_id = wire.provider_id.or(Some(provider));

		Bookmark::from_wire(wire)
			.ok_or_else(|| ApiError::Unknown {
				cause: "bookmark response lost its provider".into(),
			})
	}

	/// `DELETE /bookmarks/{provider_id}`
	pub async fn remove_bookmark(&self, provider: ProviderId) -> Result<(), ApiError> {
		self.require_user()?;

		let _: Value = self.delete(&format!("bookmarks/{provider}")).await?;

		Ok(())
	}
}

fn listing_len<T>(listing: &Listing<T>) -> usize {
	match listing {
		Listing::Bare(items) | Listing::Wrapped { items } => items.len(),
	}
}
