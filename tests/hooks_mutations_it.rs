mod support;

// self
use marketplace_gateway::{
	api::{NewReview, Provider, ReviewUpdate},
	hooks::Hooks,
};
use support::*;

fn hooks(server: &MockServer) -> Hooks {
	Hooks::new(factory(server), QueryClient::default())
}

#[tokio::test]
async fn adding_a_review_invalidates_exactly_the_affected_lists() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/providers/5/reviews");
			then.status(200).json_body(json!([]));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/users/me/reviews");
			then.status(200).json_body(json!([]));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/providers/6/reviews");
			then.status(200).json_body(json!([]));
		})
		.await;

	let created = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/reviews")
				.json_body(json!({ "provider_id": 5, "rating": 5, "comment": "Fixed it fast" }));
			then.status(201).json_body(json!({
				"id": 77,
				"provider_id": 5,
				"rating": 5,
				"comment": "Fixed it fast"
			}));
		})
		.await;
	let hooks = hooks(&server);

	hooks.provider_reviews(ProviderId(5)).await;
	hooks.provider_reviews(ProviderId(6)).await;
	hooks.user_reviews().await;

	let review = hooks
		.add_review(NewReview {
			provider_id: ProviderId(5),
			rating: 5,
			comment: Some("Fixed it fast".into()),
		})
		.await
		.expect("Review should be created.");

	assert_eq!(review.author_name, "Anonymous");
	assert_eq!(
		hooks.queries().invalidated_keys(),
		vec![QueryKey::provider_reviews(ProviderId(5)), QueryKey::user_reviews(&user())],
	);

	created.assert_calls_async(1).await;
}

async fn cached_review_lists(server: &MockServer) -> Hooks {
	for path in ["/providers/5/reviews", "/providers/6/reviews", "/users/me/reviews"] {
		server
			.mock_async(|when, then| {
				when.method(GET).path(path);
				then.status(200).json_body(json!([]));
			})
			.await;
	}

	let hooks = hooks(server);

	hooks.provider_reviews(ProviderId(5)).await;
	hooks.provider_reviews(ProviderId(6)).await;
	hooks.user_reviews().await;

	hooks
}

#[tokio::test]
async fn updating_a_review_invalidates_exactly_the_affected_lists() {
	let server = MockServer::start_async().await;
	let updated = server
		.mock_async(|when, then| {
			when.method(PUT).path("/reviews/77").json_body(json!({ "rating": 4 }));
			then.status(200).json_body(json!({ "id": 77, "provider_id": 5, "rating": 4 }));
		})
		.await;
	let hooks = cached_review_lists(&server).await;
	let review = hooks
		.update_review(ReviewId(77), ProviderId(5), ReviewUpdate { rating: Some(4), comment: None })
		.await
		.expect("Review should be updated.");

	assert_eq!(review.rating, 4);
	assert_eq!(
		hooks.queries().invalidated_keys(),
		vec![QueryKey::provider_reviews(ProviderId(5)), QueryKey::user_reviews(&user())],
	);

	updated.assert_calls_async(1).await;
}

#[tokio::test]
async fn deleting_a_review_invalidates_exactly_the_affected_lists() {
	let server = MockServer::start_async().await;
	let deleted = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/reviews/77");
			then.status(204);
		})
		.await;
	let hooks = cached_review_lists(&server).await;

	hooks.delete_review(ReviewId(77), ProviderId(5)).await.expect("Review should be deleted.");

	assert_eq!(
		hooks.queries().invalidated_keys(),
		vec![QueryKey::provider_reviews(ProviderId(5)), QueryKey::user_reviews(&user())],
	);

	deleted.assert_calls_async(1).await;
}

#[tokio::test]
async fn failed_mutations_leave_the_cache_untouched() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/providers/5/reviews");
			then.status(200).json_body(json!([]));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/reviews");
			then.status(500).json_body(json!({ "message": "database unavailable" }));
		})
		.await;

	let hooks = hooks(&server);

	hooks.provider_reviews(ProviderId(5)).await;

	let err = hooks
		.add_review(NewReview { provider_id: ProviderId(5), rating: 3, comment: None })
		.await
		.expect_err("Backend failure should surface.");

	assert_eq!(err.status(), Some(500));
	assert!(hooks.queries().invalidated_keys().is_empty());
}

#[tokio::test]
async fn bookmarking_patches_status_without_refetching() {
	let server = MockServer::start_async().await;
	let status_reads = server
		.mock_async(|when, then| {
			when.method(GET).path("/bookmarks");
			then.status(200).json_body(json!([]));
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/bookmarks").json_body(json!({ "provider_id": 12 }));
			then.status(201).json_body(json!({ "id": 300 }));
		})
		.await;

	let hooks = hooks(&server);

	assert_eq!(hooks.bookmarks().await.data.map(|list| list.len()), Some(0));
	assert_eq!(hooks.is_bookmarked(ProviderId(12)).await.data, Some(false));

	let bookmark = hooks.add_bookmark(ProviderId(12)).await.expect("Bookmark should be created.");

	assert_eq!(bookmark.provider_id, ProviderId(12));
	assert_eq!(hooks.is_bookmarked(ProviderId(12)).await.data, Some(true));
	assert_eq!(hooks.queries().invalidated_keys(), vec![QueryKey::bookmarks(&user())]);

	status_reads.assert_calls_async(2).await;
}

#[tokio::test]
async fn hero_upload_runs_issue_put_confirm_in_order() {
	let server = MockServer::start_async().await;
	let storage = MockServer::start_async().await;
	let upload_url = storage.url("/bucket/heroes/7.png?signature=abc");
	let issue = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/providers/me/hero-image/upload-url")
				.json_body(json!({ "content_type": "image/png", "file_name": "hero.png" }));
			then.status(200).json_body(json!({
				"upload_url": upload_url,
				"object_key": "heroes/7.png",
				"public_url": "https://cdn.example.com/heroes/7.png"
			}));
		})
		.await;
	let put = storage
		.mock_async(|when, then| {
			when.method(PUT)
				.path("/bucket/heroes/7.png")
				.query_param("signature", "abc")
				.header("content-type", "image/png")
				.body("PNGDATA");
			then.status(200);
		})
		.await;
	let confirm = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/providers/me/hero-image/confirm")
				.json_body(json!({ "object_key": "heroes/7.png" }));
			then.status(200).json_body(json!({ "success": true }));
		})
		.await;
	let hooks = hooks(&server);

	hooks.queries().set_query_data(&QueryKey::my_provider(&user()), |_: Option<Provider>| {
		serde_json::from_value::<marketplace_gateway::api::ProviderWire>(json!({ "id": 7 }))
			.expect("Minimal provider should decode.")
			.into()
	});

	let image = hooks
		.upload_hero_image("image/png", Some("hero.png".into()), b"PNGDATA".to_vec())
		.await
		.expect("Upload sequence should succeed.");

	assert_eq!(image.public_url.as_deref(), Some("https://cdn.example.com/heroes/7.png"));
	assert_eq!(image.object_key.as_deref(), Some("heroes/7.png"));
	assert_eq!(hooks.queries().invalidated_keys(), vec![QueryKey::my_provider(&user())]);

	issue.assert_calls_async(1).await;
	put.assert_calls_async(1).await;
	confirm.assert_calls_async(1).await;
}

#[tokio::test]
async fn hero_upload_stops_when_storage_rejects() {
	let server = MockServer::start_async().await;
	let storage = MockServer::start_async().await;
	let upload_url = storage.url("/bucket/heroes/7.png");

	server
		.mock_async(|when, then| {
			when.method(POST).path("/providers/me/hero-image/upload-url");
			then.status(200)
				.json_body(json!({ "upload_url": upload_url, "object_key": "heroes/7.png" }));
		})
		.await;
	storage
		.mock_async(|when, then| {
			when.method(PUT).path("/bucket/heroes/7.png");
			then.status(403).body("<Error>SignatureDoesNotMatch</Error>");
		})
		.await;

	let confirm = server
		.mock_async(|when, then| {
			when.method(POST).path("/providers/me/hero-image/confirm");
			then.status(200).json_body(json!({}));
		})
		.await;
	let err = hooks(&server)
		.upload_hero_image("image/png", None, b"PNGDATA".to_vec())
		.await
		.expect_err("Storage rejection should stop the sequence.");

	assert_eq!(err.status(), Some(403));

	confirm.assert_calls_async(0).await;
}
