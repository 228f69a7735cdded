mod support;

// self
use marketplace_gateway::{
	hooks::Hooks,
	query::QueryStatus,
};
use support::*;

fn hooks(server: &MockServer) -> Hooks {
	Hooks::new(factory(server), QueryClient::default())
}

#[tokio::test]
async fn concurrent_reads_share_one_request() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/providers/3");
			then.status(200)
				.json_body(json!({
					"id": 3,
					"business_name": "Quick Locks",
					"average_rating": 4.8
				}))
				.delay(std::time::Duration::from_millis(200));
		})
		.await;
	let hooks = hooks(&server);
	let tasks = (0..8)
		.map(|_| {
			let hooks = hooks.clone();

			tokio::spawn(async move { hooks.provider(ProviderId(3)).await })
		})
		.collect::<Vec<_>>();

	for task in tasks {
		let state = task.await.expect("Read task should not panic.");

		assert_eq!(state.status, QueryStatus::Success);
		assert_eq!(
			state.data.map(|provider| provider.business_name).as_deref(),
			Some("Quick Locks")
		);
	}

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn fresh_entries_are_served_without_refetching() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/categories");
			then.status(200).json_body(json!({ "data": [{ "id": 1, "name": "Home Repair" }] }));
		})
		.await;
	let hooks = hooks(&server);
	let first = hooks.categories().await;
	let second = hooks.categories().await;

	assert!(first.is_success());
	assert!(!second.is_stale);
	assert_eq!(second.data.expect("Second read should carry cached data.")[0].slug, "home-repair");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn client_errors_settle_without_retrying() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/providers/404");
			then.status(404).json_body(json!({ "error": "Provider not found" }));
		})
		.await;
	let state = hooks(&server).provider(ProviderId(404)).await;

	assert!(state.is_error());
	assert!(state.data.is_none());
	assert_eq!(state.error.and_then(|e| e.status()), Some(404));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn server_errors_are_retried_once() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/providers/9/reviews");
			then.status(503).body("maintenance");
		})
		.await;
	let queries = QueryClient::new(
		QueryOptions::default().with_retry_delay(Duration::milliseconds(10)),
	);
	let state = Hooks::new(factory(&server), queries).provider_reviews(ProviderId(9)).await;

	assert!(state.is_error());

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn user_scoped_reads_stay_idle_when_signed_out() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.any_request();
			then.status(200).json_body(json!([]));
		})
		.await;
	let hooks = Hooks::new(
		ApiClientFactory::new(base_url(&server), Arc::new(AnonymousTokenSource)),
		QueryClient::default(),
	);

	assert_eq!(hooks.bookmarks().await.status, QueryStatus::Idle);
	assert_eq!(hooks.user_reviews().await.status, QueryStatus::Idle);
	assert_eq!(hooks.is_bookmarked(ProviderId(1)).await.status, QueryStatus::Idle);
	assert_eq!(hooks.user_profile().await.status, QueryStatus::Idle);

	mock.assert_calls_async(0).await;
}
