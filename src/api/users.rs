// self
use crate::{
	_prelude::*,
	api::models::{UserProfile, UserProfileWire},
	http::ApiClient,
};

/// Partial update for `PUT /users/me`.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub image_url: Option<String>,
}

impl ApiClient {
	/// `GET /users/me`
	pub async fn me(&self) -> Result<UserProfile, ApiError> {
		self.require_user()?;

		let wire: UserProfileWire = self.get("users/me", &[]).await?;

		Ok(wire.into())
	}

	/// `PUT /users/me`
	pub async fn update_me(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
		self.require_user()?;

		let wire: UserProfileWire = self.put("users/me", update).await?;

		Ok(wire.into())
	}
}
