mod support;

// self
use support::*;

async fn reverse(url: &str, body: Value) -> (u16, Value) {
	let response = http()
		.post(format!("{url}/api/mapbox/reverse"))
		.json(&body)
		.send()
		.await
		.expect("Gateway should answer.");
	let status = response.status().as_u16();

	(status, response.json().await.expect("Body should be JSON."))
}

fn configured(geocoder: &MockServer) -> AppState {
	state(
		source("http://127.0.0.1:1", &geocoder.base_url())
			.with(keys::MAPBOX_ACCESS_TOKEN, "pk.test"),
	)
}

#[tokio::test]
async fn coordinates_resolve_to_the_first_feature() {
	let geocoder = MockServer::start_async().await;
	let mock = geocoder
		.mock_async(|when, then| {
			when.method(GET)
				.path("/geocoding/v5/mapbox.places/-122.42,37.77.json")
				.query_param("access_token", "pk.test")
				.query_param("limit", "1");
			then.status(200).json_body(json!({
				"features": [{
					"id": "address.123",
					"place_name": "500 Market Street, San Francisco, California 94105, United States",
					"text": "Market Street",
					"address": "500",
					"context": [
						{ "id": "postcode.1", "text": "94105" },
						{ "id": "place.2", "text": "San Francisco" },
						{ "id": "region.3", "text": "California" },
						{ "id": "country.4", "text": "United States" }
					]
				}]
			}));
		})
		.await;
	let url = spawn_gateway(configured(&geocoder)).await;
	let (status, body) = reverse(&url, json!({ "latitude": 37.77, "longitude": -122.42 })).await;

	assert_eq!(status, 200);
	assert_eq!(
		body,
		json!({
			"formatted_address": "500 Market Street, San Francisco, California 94105, United States",
			"street": "500 Market Street",
			"city": "San Francisco",
			"state": "California",
			"postal_code": "94105",
			"country": "United States"
		})
	);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn out_of_range_coordinates_never_reach_the_geocoder() {
	let geocoder = MockServer::start_async().await;
	let mock = geocoder
		.mock_async(|when, then| {
			when.any_request();
			then.status(200).json_body(json!({ "features": [] }));
		})
		.await;
	let url = spawn_gateway(configured(&geocoder)).await;
	let (status, body) = reverse(&url, json!({ "latitude": 999.0, "longitude": 10.0 })).await;

	assert_eq!(status, 400);
	assert_eq!(body, json!({ "error": "latitude must be between -90 and 90" }));

	let (status, _) = reverse(&url, json!({ "latitude": 10.0 })).await;

	assert_eq!(status, 400);

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn missing_token_is_a_configuration_error() {
	let geocoder = MockServer::start_async().await;
	let url = spawn_gateway(state(source("http://127.0.0.1:1", &geocoder.base_url()))).await;
	let (status, body) = reverse(&url, json!({ "latitude": 37.77, "longitude": -122.42 })).await;

	assert_eq!(status, 500);
	assert_eq!(body, json!({ "error": "Geocoding is not configured" }));
}

#[tokio::test]
async fn empty_results_are_not_found() {
	let geocoder = MockServer::start_async().await;

	geocoder
		.mock_async(|when, then| {
			when.method(GET).path("/geocoding/v5/mapbox.places/0,0.json");
			then.status(200).json_body(json!({ "type": "FeatureCollection", "features": [] }));
		})
		.await;

	let url = spawn_gateway(configured(&geocoder)).await;
	let (status, body) = reverse(&url, json!({ "latitude": 0.0, "longitude": 0.0 })).await;

	assert_eq!(status, 404);
	assert_eq!(body, json!({ "error": "No address found for these coordinates" }));
}

#[tokio::test]
async fn geocoder_rejections_are_relayed() {
	let geocoder = MockServer::start_async().await;

	geocoder
		.mock_async(|when, then| {
			when.method(GET).path("/geocoding/v5/mapbox.places/2.5,1.5.json");
			then.status(401).json_body(json!({ "message": "Not Authorized - Invalid Token" }));
		})
		.await;

	let url = spawn_gateway(configured(&geocoder)).await;
	let (status, body) = reverse(&url, json!({ "latitude": 1.5, "longitude": 2.5 })).await;

	assert_eq!(status, 401);
	assert_eq!(body, json!({ "error": "Not Authorized - Invalid Token" }));
}
