// self
use crate::{_prelude::*, http::ApiClient};

/// Contact-form submission relayed to `POST /contact`.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
	pub name: String,
	pub email: String,
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subject: Option<String>,
}
impl ContactMessage {
	/// Names the first blank required field, or an email without `@`.
	pub fn validate(&self) -> Result<(), ApiError> {
		for (field, value) in
			[("name", &self.name), ("email", &self.email), ("message", &self.message)]
		{
			if value.trim().is_empty() {
				return Err(ApiError::invalid(format!("`{field}` is required")));
			}
		}

		if !self.email.contains('@') {
			return Err(ApiError::invalid("`email` is not an email address"));
		}

		Ok(())
	}
}

impl ApiClient {
	/// `POST /contact`; public.
	pub async fn send_contact(&self, message: &ContactMessage) -> Result<(), ApiError> {
		message.validate()?;

		let _: Value = self.post("contact", message).await?;

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn validation_names_the_missing_field() {
		let message = ContactMessage {
			name: "Ada".into(),
			email: " ".into(),
			message: "Hello".into(),
			subject: None,
		};
		let err = message.validate().expect_err("Blank email should be rejected.");

		assert!(matches!(err, ApiError::Invalid { ref reason } if reason.contains("email")));
	}
}
