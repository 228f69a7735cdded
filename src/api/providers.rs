//! Provider listings, search, categories, and the signed-in owner's listing.

// self
use crate::{
	_prelude::*,
	api::models::{
		Category, CategoryWire, Listing, Provider, ProviderPage, ProviderPageWire, ProviderWire,
	},
	auth::{CategoryId, ProviderId},
	http::ApiClient,
};

/// Filters for `GET /providers`.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderFilter {
	pub category_id: Option<CategoryId>,
	pub city: Option<String>,
	pub state: Option<String>,
	pub verified_only: bool,
	pub min_rating: Option<f64>,
	pub sort: Option<String>,
	pub page: Option<u32>,
	pub limit: Option<u32>,
}
impl ProviderFilter {
	/// Non-empty filters as query pairs, in a stable order.
	pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
		let mut pairs = Vec::new();

		push(&mut pairs, "category_id", self.category_id);
		push_text(&mut pairs, "city", self.city.as_deref());
		push_text(&mut pairs, "state", self.state.as_deref());

		if self.verified_only {
			pairs.push(("is_verified", "true".into()));
		}

		push(&mut pairs, "min_rating", self.min_rating);
		push_text(&mut pairs, "sort", self.sort.as_deref());
		push(&mut pairs, "page", self.page);
		push(&mut pairs, "limit", self.limit);

		pairs
	}
}

/// Parameters for `GET /providers/search`.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
	pub query: String,
	pub category_id: Option<CategoryId>,
	pub city: Option<String>,
	pub latitude: Option<f64>,
	pub longitude: Option<f64>,
	pub radius_km: Option<f64>,
	pub page: Option<u32>,
	pub limit: Option<u32>,
}
impl SearchParams {
	/// Free-text search.
	pub fn text(query: impl Into<String>) -> Self {
		Self { query: query.into(), ..Default::default() }
	}

	/// Rejects searches with neither text nor a complete coordinate pair.
	pub fn validate(&self) -> Result<(), ApiError> {
		let has_text = !self.query.trim().is_empty();
		let has_point = self.latitude.is_some() && self.longitude.is_some();

		if has_text || has_point {
			Ok(())
		} else {
			Err(ApiError::invalid("search needs a query or a latitude/longitude pair"))
		}
	}

	/// Non-empty parameters as query pairs, in a stable order.
	pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
		let mut pairs = Vec::new();

		push_text(&mut pairs, "q", Some(self.query.as_str()));
		push(&mut pairs, "category_id", self.category_id);
		push_text(&mut pairs, "city", self.city.as_deref());
		push(&mut pairs, "lat", self.latitude);
		push(&mut pairs, "lng", self.longitude);
		push(&mut pairs, "radius_km", self.radius_km);
		push(&mut pairs, "page", self.page);
		push(&mut pairs, "limit", self.limit);

		pairs
	}
}

/// Partial update for `PUT /providers/me`; absent fields are left untouched.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderUpdate {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub business_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub category_id: Option<CategoryId>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub address: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub city: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub state: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub postal_code: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub phone: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub website: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub latitude: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub longitude: Option<f64>,
}

impl ApiClient {
	/// `GET /providers`
	pub async fn list_providers(&self, filter: &ProviderFilter) -> Result<ProviderPage, ApiError> {
		let page: ProviderPageWire = self.get("providers", &filter.query_pairs()).await?;

		Ok(page.into())
	}

	/// `GET /providers/search`
	pub async fn search_providers(&self, params: &SearchParams) -> Result<ProviderPage, ApiError> {
		params.validate()?;

		let page: ProviderPageWire = self.get("providers/search", &params.query_pairs()).await?;

		Ok(page.into())
	}

	/// `GET /providers/{id}`
	pub async fn provider(&self, id: ProviderId) -> Result<Provider, ApiError> {
		let wire: ProviderWire = self.get(&format!("providers/{id}"), &[]).await?;

		Ok(wire.into())
	}

	/// `GET /categories`
	pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
		let listing: Listing<CategoryWire> = self.get("categories", &[]).await?;

		Ok(listing.into_vec().into_iter().map(Category::from).collect())
	}

	/// `GET /providers/me`
	pub async fn my_provider(&self) -> Result<Provider, ApiError> {
		self.require_user()?;

		let wire: ProviderWire = self.get("providers/me", &[]).await?;

		Ok(wire.into())
	}

	/// `PUT /providers/me`
	pub async fn update_my_provider(&self, update: &ProviderUpdate) -> Result<Provider, ApiError> {
		self.require_user()?;

		let wire: ProviderWire = self.put("providers/me", update).await?;

		Ok(wire.into())
	}
}

fn push<T>(pairs: &mut Vec<(&'static str, String)>, name: &'static str, value: Option<T>)
where
	T: ToString,
{
	if let Some(value) = value {
		pairs.push((name, value.to_string()));
	}
}

fn push_text(pairs: &mut Vec<(&'static str, String)>, name: &'static str, value: Option<&str>) {
	if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
		pairs.push((name, value.to_owned()));
	}
}
