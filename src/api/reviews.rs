//! Reviews: per-provider listings and the signed-in user's own reviews.

// self
use crate::{
	_prelude::*,
	api::models::{Listing, Review, ReviewWire},
	auth::{ProviderId, ReviewId},
	http::ApiClient,
};

const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Body of `POST /reviews`.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewReview {
	pub provider_id: ProviderId,
	pub rating: u8,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub comment: Option<String>,
}
impl NewReview {
	/// Checks the rating range before anything is sent.
	pub fn validate(&self) -> Result<(), ApiError> {
		validate_rating(self.rating)
	}
}

/// Body of `PUT /reviews/{id}`.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewUpdate {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rating: Option<u8>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub comment: Option<String>,
}
impl ReviewUpdate {
	/// Rejects empty updates and out-of-range ratings.
	pub fn validate(&self) -> Result<(), ApiError> {
		if self.rating.is_none() && self.comment.is_none() {
			return Err(ApiError::invalid("review update changes nothing"));
		}

		self.rating.map_or(Ok(()), validate_rating)
	}
}

impl ApiClient {
	/// `GET /providers/{id}/reviews`
	pub async fn provider_reviews(&self, id: ProviderId) -> Result<Vec<Review>, ApiError> {
		let listing: Listing<ReviewWire> = self.get(&format!("providers/{id}/reviews"), &[]).await?;

		Ok(listing.into_vec().into_iter().map(Review::from).collect())
	}

	/// `GET /users/me/reviews`
	pub async fn my_reviews(&self) -> Result<Vec<Review>, ApiError> {
		self.require_user()?;

		let listing: Listing<ReviewWire> = self.get("users/me/reviews", &[]).await?;

		Ok(listing.into_vec().into_iter().map(Review::from).collect())
	}

	/// `POST /reviews`
	pub async fn create_review(&self, review: &NewReview) -> Result<Review, ApiError> {
		self.require_user()?;
		review.validate()?;

		let wire: ReviewWire = self.post("reviews", review).await?;

		Ok(wire.into())
	}

	/// `PUT /reviews/{id}`
	pub async fn update_review(
		&self,
		id: ReviewId,
		update: &ReviewUpdate,
	) -> Result<Review, ApiError> {
		self.require_user()?;
		update.validate()?;

		let wire: ReviewWire = self.put(&format!("reviews/{id}"), update).await?;

		Ok(wire.into())
	}

	/// `DELETE /reviews/{id}`
	pub async fn delete_review(&self, id: ReviewId) -> Result<(), ApiError> {
		self.require_user()?;

		let _: Value = self.delete(&format!("reviews/{id}")).await?;

		Ok(())
	}
}

fn validate_rating(rating: u8) -> Result<(), ApiError> {
	if RATING_RANGE.contains(&rating) {
		Ok(())
	} else {
		Err(ApiError::invalid(format!("rating must be between 1 and 5, got {rating}")))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn rating_must_be_in_range() {
		let mut review = NewReview { provider_id: ProviderId(1), rating: 0, comment: None };

		assert!(matches!(review.validate(), Err(ApiError::Invalid { .. })));

		review.rating = 5;

		assert!(review.validate().is_ok());
		assert!(ReviewUpdate::default().validate().is_err());
		assert!(ReviewUpdate { rating: Some(6), comment: None }.validate().is_err());
	}
}
