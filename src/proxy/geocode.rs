//! `POST /api/mapbox/reverse`: coordinates in, one postal address out.

// crates.io
use axum::{Json, body::Bytes, extract::State};
// self
use crate::{
	_prelude::*,
	config::keys,
	http,
	obs::{self, CallKind},
	proxy::{AppState, ProxyError, json_body},
};

const FEATURE_TYPES: &str = "address,place,postcode";

/// Route input.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReverseGeocodeRequest {
	/// Degrees, `[-90, 90]`.
	pub latitude: f64,
	/// Degrees, `[-180, 180]`.
	pub longitude: f64,
}
impl ReverseGeocodeRequest {
	/// Rejects non-finite or out-of-range coordinates.
	pub fn validate(&self) -> Result<(), ProxyError> {
		if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
			return Err(ProxyError::bad_request("latitude must be between -90 and 90"));
		}
		if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
			return Err(ProxyError::bad_request("longitude must be between -180 and 180"));
		}

		Ok(())
	}
}

/// Route output, derived from the first feature of the geocoding response.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseGeocode {
	pub formatted_address: String,
	pub street: Option<String>,
	pub city: Option<String>,
	pub state: Option<String>,
	pub postal_code: Option<String>,
	pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
	#[serde(default)]
	features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
	#[serde(default)]
	id: String,
	#[serde(default)]
	place_name: String,
	#[serde(default)]
	text: String,
	address: Option<String>,
	#[serde(default)]
	context: Vec<ContextEntry>,
}
impl Feature {
	fn into_address(self) -> ReverseGeocode {
		let layer = |prefix: &str| {
			self.context
				.iter()
				.find(|entry| entry.id.starts_with(prefix))
				.map(|entry| entry.text.clone())
				.or_else(|| self.id.starts_with(prefix).then(|| self.text.clone()))
				.filter(|text| !text.is_empty())
		};
		let street = match (&self.address, self.id.starts_with("address.")) {
			(Some(number), _) if !self.text.is_empty() => Some(format!("{number} {}", self.text)),
			(None, true) if !self.text.is_empty() => Some(self.text.clone()),
			_ => None,
		};

		ReverseGeocode {
			street,
			city: layer("place."),
			state: layer("region."),
			postal_code: layer("postcode."),
			country: layer("country."),
			formatted_address: self.place_name.clone(),
		}
	}
}

#[derive(Debug, Deserialize)]
struct ContextEntry {
	#[serde(default)]
	id: String,
	#[serde(default)]
	text: String,
}

pub(super) async fn reverse(
	State(state): State<AppState>,
	body: Bytes,
) -> Result<Json<ReverseGeocode>, ProxyError> {
	let request = json_body::<ReverseGeocodeRequest>(&body)?;

	request.validate()?;

	let token = state
		.settings
		.get(keys::MAPBOX_ACCESS_TOKEN)
		.ok_or(ProxyError::Misconfigured { what: "Geocoding" })?;
	let url = state
		.geocoding_url
		.join(&format!(
			"geocoding/v5/mapbox.places/{},{}.json",
			request.longitude, request.latitude
		))
		.map_err(ProxyError::internal)?;
	let builder = state.http.get(url).query(&[
		("access_token", token.as_str()),
		("types", FEATURE_TYPES),
		("limit", "1"),
	]);

	state.metrics.record_upstream_call();

	let features = obs::observe(CallKind::Geocoding, "reverse", async move {
		let response = builder.send().await?;

		http::interpret::<FeatureCollection>(response).await
	})
	.await?;
	let feature = features
		.features
		.into_iter()
		.next()
		.ok_or_else(|| ProxyError::NotFound {
			message: "No address found for these coordinates".into(),
		})?;

	Ok(Json(feature.into_address()))
}
