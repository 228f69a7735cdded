mod support;

// self
use support::*;

struct Upload {
	url: String,
	state: AppState,
	backend: MockServer,
	storage: MockServer,
}
impl Upload {
	async fn start() -> Self {
		let backend = MockServer::start_async().await;
		let storage = MockServer::start_async().await;
		let state = state(
			source(&backend.base_url(), "http://127.0.0.1:1")
				.with(keys::STORAGE_UPLOAD_ORIGIN, storage.base_url()),
		);
		let url = spawn_gateway(state.clone()).await;

		Self { url, state, backend, storage }
	}

	async fn accept_sessions(&self) -> httpmock::Mock<'_> {
		self.backend
			.mock_async(|when, then| {
				when.method(GET).path("/users/me");
				then.status(200).json_body(json!({ "id": USER, "email": "pat@example.com" }));
			})
			.await
	}

	fn target(&self, path: &str) -> String {
		self.storage.url(path)
	}

	async fn put(&self, target: Option<&str>, body: &'static str) -> reqwest::Response {
		let mut request = http()
			.put(format!("{}/api/upload", self.url))
			.bearer_auth(jwt(USER))
			.header("content-type", "image/jpeg")
			.body(body);

		if let Some(target) = target {
			request = request.query(&[("url", target)]);
		}

		request.send().await.expect("Gateway should answer.")
	}
}

#[tokio::test]
async fn uploads_stream_to_the_signed_url_after_the_backend_accepts_the_token() {
	let upload = Upload::start().await;
	let confirmed = upload.accept_sessions().await;
	let put = upload
		.storage
		.mock_async(|when, then| {
			when.method(PUT)
				.path("/bucket/heroes/7.png")
				.header("content-type", "image/jpeg")
				.body("JPEGDATA");
			then.status(200);
		})
		.await;
	let target = upload.target("/bucket/heroes/7.png");
	let response = upload.put(Some(&target), "JPEGDATA").await;

	assert_eq!(response.status(), 200);
	assert_eq!(
		response.json::<Value>().await.expect("Body should be JSON."),
		json!({ "success": true })
	);
	assert_eq!(upload.state.metrics().upstream_calls(), 2);

	confirmed.assert_calls_async(1).await;
	put.assert_calls_async(1).await;
}

#[tokio::test]
async fn forged_tokens_never_reach_storage() {
	let upload = Upload::start().await;
	let confirmation = upload
		.backend
		.mock_async(|when, then| {
			when.method(GET).path("/users/me");
			then.status(401).json_body(json!({ "error": "Invalid token" }));
		})
		.await;
	let storage = upload
		.storage
		.mock_async(|when, then| {
			when.any_request();
			then.status(200);
		})
		.await;
	let target = upload.target("/bucket/heroes/7.png");
	let response = upload.put(Some(&target), "JPEGDATA").await;

	assert_eq!(response.status(), 401);
	assert_eq!(
		response.json::<Value>().await.expect("Error body should be JSON."),
		json!({ "error": "Unauthorized" })
	);

	confirmation.assert_calls_async(1).await;
	storage.assert_calls_async(0).await;
}

#[tokio::test]
async fn targets_off_the_storage_origin_are_refused() {
	let upload = Upload::start().await;
	let confirmed = upload.accept_sessions().await;
	let internal = upload.backend.url("/internal/admin");

	for target in [internal.as_str(), "http://169.254.169.254/latest/meta-data"] {
		let response = upload.put(Some(target), "JPEGDATA").await;

		assert_eq!(response.status(), 400);
		assert!(response.json::<Value>().await.expect("Body should be JSON.")["error"].is_string());
	}

	assert_eq!(upload.state.metrics().upstream_calls(), 0);

	confirmed.assert_calls_async(0).await;
}

#[tokio::test]
async fn malformed_targets_are_json_bad_requests() {
	let upload = Upload::start().await;
	let confirmed = upload.accept_sessions().await;
	let missing = upload.put(None, "JPEGDATA").await;

	assert_eq!(missing.status(), 400);

	let relative = upload.put(Some("/bucket/expired.png"), "JPEGDATA").await;

	assert_eq!(relative.status(), 400);

	let duplicated = http()
		.put(format!("{}/api/upload?url=a&url=b", upload.url))
		.bearer_auth(jwt(USER))
		.body("JPEGDATA")
		.send()
		.await
		.expect("Gateway should answer.");

	assert_eq!(duplicated.status(), 400);
	assert!(
		duplicated.json::<Value>().await.expect("Query rejection should be JSON.")["error"]
			.is_string()
	);

	confirmed.assert_calls_async(0).await;
}

#[tokio::test]
async fn storage_rejections_are_relayed() {
	let upload = Upload::start().await;

	upload.accept_sessions().await;
	upload
		.storage
		.mock_async(|when, then| {
			when.method(PUT).path("/bucket/expired.png");
			then.status(403).body("Request has expired");
		})
		.await;

	let target = upload.target("/bucket/expired.png");
	let rejected = upload.put(Some(&target), "JPEGDATA").await;

	assert_eq!(rejected.status(), 403);
	assert_eq!(
		rejected.json::<Value>().await.expect("Error body should be JSON."),
		json!({ "error": "Request has expired" })
	);
}

#[tokio::test]
async fn uploads_are_disabled_without_a_storage_origin() {
	let backend = MockServer::start_async().await;
	let url = spawn_gateway(state(source(&backend.base_url(), "http://127.0.0.1:1"))).await;
	let response = http()
		.put(format!("{url}/api/upload"))
		.query(&[("url", "https://bucket.example.com/heroes/7.png")])
		.bearer_auth(jwt(USER))
		.body("JPEGDATA")
		.send()
		.await
		.expect("Gateway should answer.");

	assert_eq!(response.status(), 500);
	assert_eq!(
		response.json::<Value>().await.expect("Error body should be JSON."),
		json!({ "error": "Storage upload origin is not configured" })
	);
}
