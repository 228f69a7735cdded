//! Hero-image upload: issue a pre-signed URL, PUT the bytes, then confirm the object key.

// self
use crate::{_prelude::*, http::ApiClient};

/// Body of `POST /providers/me/hero-image/upload-url`.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroUploadRequest {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content_type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file_name: Option<String>,
}

/// Pre-signed upload issued by the backend.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroUploadTicket {
	pub upload_url: String,
	pub object_key: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub public_url: Option<String>,
}

/// Body of `POST /providers/me/hero-image/confirm`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroConfirm {
	/// Storage key returned in the ticket.
	pub object_key: String,
}

/// Backend acknowledgement of a confirmed upload.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroImage {
	#[serde(default, alias = "hero_image_url")]
	pub public_url: Option<String>,
	#[serde(default)]
	pub object_key: Option<String>,
}

/// Public URL of `object_key` under a storage base such as `https://cdn.example.com/media`.
pub fn public_object_url(storage_base: &str, object_key: &str) -> Option<String> {
	let base = storage_base.trim().trim_end_matches('/');
	let key = object_key.trim().trim_start_matches('/');

	(!base.is_empty() && !key.is_empty()).then(|| format!("{base}/{key}"))
}

impl ApiClient {
	/// `POST /providers/me/hero-image/upload-url`
	pub async fn request_hero_upload(
		&self,
		request: &HeroUploadRequest,
	) -> Result<HeroUploadTicket, ApiError> {
		self.require_user()?;
		self.post("providers/me/hero-image/upload-url", request).await
	}

	/// PUTs the image bytes to the ticket's pre-signed URL.
	pub async fn upload_hero_bytes(
		&self,
		ticket: &HeroUploadTicket,
		content_type: &str,
		bytes: Vec<u8>,
	) -> Result<(), ApiError> {
		let url = Url::parse(&ticket.upload_url)
			.map_err(|e| ApiError::invalid(format!("upload URL is not absolute: {e}")))?;

		self.put_bytes(url, content_type, bytes).await
	}

	/// `POST /providers/me/hero-image/confirm`
	pub async fn confirm_hero_upload(&self, confirm: &HeroConfirm) -> Result<HeroImage, ApiError> {
		self.require_user()?;
		self.post("providers/me/hero-image/confirm", confirm).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn public_url_joins_without_doubled_slashes() {
		assert_eq!(
			public_object_url("https://cdn.example.com/media/", "/heroes/7.png").as_deref(),
			Some("https://cdn.example.com/media/heroes/7.png")
		);
		assert!(public_object_url("", "heroes/7.png").is_none());
	}
}
