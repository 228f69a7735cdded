//! Identifiers for users and backend records.

// std
use std::ops::Deref;
// self
use crate::_prelude::*;

macro_rules! def_record_id {
	($name:ident, $doc:literal) => {
		#[doc = $doc]
		#[derive(
			Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
		)]
		#[serde(transparent)]
		pub struct $name(pub u64);
		impl From<u64> for $name {
			fn from(value: u64) -> Self {
				Self(value)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				Display::fmt(&self.0, f)
			}
		}
		impl FromStr for $name {
			type Err = std::num::ParseIntError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				s.parse().map(Self)
			}
		}
	};
}

/// Identity-provider subject (`sub` claim), e.g. `user_2abc`.
///
/// Only ASCII letters, digits, `_` and `-` are accepted, so the value can be embedded in
/// backend paths and cache keys without escaping.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);
impl UserId {
	/// Longest subject the gateway accepts.
	pub const MAX_LEN: usize = 64;

	/// Validates and wraps a subject.
	pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
		let value = value.into();

		if value.is_empty() {
			return Err(IdentifierError::Empty);
		}
		if value.len() > Self::MAX_LEN {
			return Err(IdentifierError::TooLong { len: value.len(), max: Self::MAX_LEN });
		}
		if let Some((position, found)) = value
			.char_indices()
			.find(|(_, c)| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-')))
		{
			return Err(IdentifierError::InvalidCharacter { found, position });
		}

		Ok(Self(value))
	}
}
impl Deref for UserId {
	type Target = str;

	fn deref(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for UserId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<UserId> for String {
	fn from(value: UserId) -> Self {
		value.0
	}
}
impl TryFrom<String> for UserId {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for UserId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for UserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("UserId").field(&self.0).finish()
	}
}
impl Display for UserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Why a string was refused as a [`UserId`].
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	#[error("user id is empty")]
	Empty,
	#[error("user id is {len} bytes long, the limit is {max}")]
	TooLong { len: usize, max: usize },
	#[error("user id contains {found:?} at byte {position}")]
	InvalidCharacter { found: char, position: usize },
}

def_record_id! { ProviderId, "Backend-assigned identifier of a provider listing." }
def_record_id! { CategoryId, "Backend-assigned identifier of a listing category." }
def_record_id! { ReviewId, "Backend-assigned identifier of a review." }
def_record_id! { BookmarkId, "Backend-assigned identifier of a bookmark." }
