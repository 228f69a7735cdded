//! Backend wire shapes and the view models derived from them.
//!
//! Wire types mirror the backend (snake_case, nullable everything). View models serialize in
//! camelCase and replace nulls with defaults. The `From` impls are pure field remapping.

// self
use crate::{
	_prelude::*,
	auth::{BookmarkId, CategoryId, ProviderId, ReviewId},
};

/// List payload that arrives either bare (`[...]`) or wrapped (`{"items": [...]}`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
	/// Top-level JSON array.
	Bare(Vec<T>),
	/// Object carrying the array under `items`, `data`, or `results`.
	Wrapped {
		/// Wrapped entries.
		#[serde(alias = "data", alias = "results")]
		items: Vec<T>,
	},
}
impl<T> Listing<T> {
	/// Unwraps the entries.
	pub fn into_vec(self) -> Vec<T> {
		match self {
			Self::Bare(items) | Self::Wrapped { items } => items,
		}
	}
}

/// Provider listing as returned by the backend.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderWire {
	pub id: ProviderId,
	#[serde(alias = "name")]
	pub business_name: Option<String>,
	pub description: Option<String>,
	pub category_id: Option<CategoryId>,
	pub category_name: Option<String>,
	pub address: Option<String>,
	pub city: Option<String>,
	pub state: Option<String>,
	pub postal_code: Option<String>,
	pub phone: Option<String>,
	pub email: Option<String>,
	pub website: Option<String>,
	pub hero_image_url: Option<String>,
	#[serde(alias = "rating")]
	pub average_rating: Option<f64>,
	pub review_count: Option<u32>,
	pub is_verified: Option<bool>,
	pub latitude: Option<f64>,
	pub longitude: Option<f64>,
	pub created_at: Option<String>,
}

/// Provider listing shaped for rendering.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
	pub id: ProviderId,
	pub business_name: String,
	pub description: String,
	pub category_id: Option<CategoryId>,
	pub category: Option<String>,
	pub address: Option<String>,
	pub city: Option<String>,
	pub state: Option<String>,
	pub postal_code: Option<String>,
	pub phone: Option<String>,
	pub email: Option<String>,
	pub website: Option<String>,
	pub hero_image_url: Option<String>,
	pub rating: f64,
	pub review_count: u32,
	pub is_verified: bool,
	pub latitude: Option<f64>,
	pub longitude: Option<f64>,
	pub created_at: Option<String>,
}
impl From<ProviderWire> for Provider {
	fn from(wire: ProviderWire) -> Self {
		Self {
			id: wire.id,
			business_name: wire.business_name.unwrap_or_default(),
			description: wire.description.unwrap_or_default(),
			category_id: wire.category_id,
			category: wire.category_name,
			address: wire.address,
			city: wire.city,
			state: wire.state,
			postal_code: wire.postal_code,
			phone: wire.phone,
			email: wire.email,
			website: wire.website,
			hero_image_url: wire.hero_image_url,
			rating: wire.average_rating.unwrap_or(0.0),
			review_count: wire.review_count.unwrap_or(0),
			is_verified: wire.is_verified.unwrap_or(false),
			latitude: wire.latitude,
			longitude: wire.longitude,
			created_at: wire.created_at,
		}
	}
}

/// Paginated provider list as returned by list and search endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderPageWire {
	/// Listings on this page.
	#[serde(default, alias = "items", alias = "results")]
	pub providers: Vec<ProviderWire>,
	/// Total matches across pages.
	pub total: Option<u64>,
	/// 1-based page number.
	pub page: Option<u32>,
	/// Page size.
	pub limit: Option<u32>,
}

/// Page of provider view models.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderPage {
	pub providers: Vec<Provider>,
	pub total: u64,
	pub page: u32,
	pub limit: u32,
}
impl From<ProviderPageWire> for ProviderPage {
	fn from(wire: ProviderPageWire) -> Self {
		let count = wire.providers.len();

		Self {
			total: wire.total.unwrap_or(count as u64),
			page: wire.page.unwrap_or(1),
			limit: wire.limit.unwrap_or(count as u32),
			providers: wire.providers.into_iter().map(Provider::from).collect(),
		}
	}
}

/// Listing category as returned by the backend.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryWire {
	pub id: CategoryId,
	pub name: String,
	pub slug: Option<String>,
	pub provider_count: Option<u32>,
}

/// Listing category shaped for rendering.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
	pub id: CategoryId,
	pub name: String,
	pub slug: String,
	pub provider_count: u32,
}
impl From<CategoryWire> for Category {
	fn from(wire: CategoryWire) -> Self {
		let slug = wire.slug.unwrap_or_else(|| slugify(&wire.name));

		Self {
			id: wire.id,
			name: wire.name,
			slug,
			provider_count: wire.provider_count.unwrap_or(0),
		}
	}
}

/// Review as returned by the backend.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewWire {
	pub id: ReviewId,
	pub provider_id: ProviderId,
	pub user_id: Option<String>,
	pub rating: u8,
	pub comment: Option<String>,
	pub user_name: Option<String>,
	pub created_at: Option<String>,
}

/// Review shaped for rendering.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
	pub id: ReviewId,
	pub provider_id: ProviderId,
	pub user_id: Option<String>,
	pub rating: u8,
	pub comment: String,
	pub author_name: String,
	pub created_at: Option<String>,
}
impl From<ReviewWire> for Review {
	fn from(wire: ReviewWire) -> Self {
		Self {
			id: wire.id,
			provider_id: wire.provider_id,
			user_id: wire.user_id,
			rating: wire.rating,
			comment: wire.comment.unwrap_or_default(),
			author_name: wire
				.user_name
				.filter(|name| !name.trim().is_empty())
				.unwrap_or_else(|| "Anonymous".into()),
			created_at: wire.created_at,
		}
	}
}

/// Bookmark as returned by the backend.
///
/// Some endpoints send `provider_id`, others only embed the bookmarked `provider`. The
/// bookmark's own `id` is never a provider identifier.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookmarkWire {
	pub id: BookmarkId,
	pub provider_id: Option<ProviderId>,
	pub provider: Option<ProviderWire>,
	pub created_at: Option<String>,
}

/// Bookmark shaped for rendering.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
	pub id: BookmarkId,
	pub provider_id: ProviderId,
	pub provider: Option<Provider>,
	pub created_at: Option<String>,
}
impl Bookmark {
	/// Maps a wire bookmark; `None` when it names no provider at all.
	pub fn from_wire(wire: BookmarkWire) -> Option<Self> {
		let provider_id = wire.provider_id.or_else(|| wire.provider.as_ref().map(|p| p.id))?;

		Some(Self {
			id: wire.id,
			provider_id,
			provider: wire.provider.map(Provider::from),
			created_at: wire.created_at,
		})
	}
}

/// User profile as returned by the backend.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfileWire {
	pub id: String,
	pub email: Option<String>,
	pub first_name: Option<String>,
	pub last_name: Option<String>,
	pub image_url: Option<String>,
	pub role: Option<String>,
}

/// User profile shaped for rendering.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
	pub id: String,
	pub email: String,
	pub first_name: String,
	pub last_name: String,
	pub image_url: Option<String>,
	pub role: String,
}
impl UserProfile {
	/// First and last name joined, or the email when both are blank.
	pub fn display_name(&self) -> String {
		let name = format!("{} {}", self.first_name, self.last_name);
		let name = name.trim();

		if name.is_empty() { self.email.clone() } else { name.to_owned() }
	}
}
impl From<UserProfileWire> for UserProfile {
	fn from(wire: UserProfileWire) -> Self {
		Self {
			id: wire.id,
			email: wire.email.unwrap_or_default(),
			first_name: wire.first_name.unwrap_or_default(),
			last_name: wire.last_name.unwrap_or_default(),
			image_url: wire.image_url,
			role: wire.role.unwrap_or_else(|| "user".into()),
		}
	}
}

fn slugify(name: &str) -> String {
	let mut slug = String::with_capacity(name.len());

	for c in name.chars() {
		if c.is_ascii_alphanumeric() {
			slug.push(c.to_ascii_lowercase());
		} else if !slug.is_empty() && !slug.ends_with('-') {
			slug.push('-');
		}
	}

	slug.trim_end_matches('-').to_owned()
}
