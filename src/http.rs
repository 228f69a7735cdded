//! API client factory and uniform response interpretation.
//!
//! [`ApiClientFactory`] resolves the backend base URL once and asks its [`TokenSource`] for a
//! fresh token every time [`ApiClientFactory::client`] is called, so each outbound call
//! carries a credential fetched no earlier than the start of that call. [`ApiClient`] is the
//! short-lived handle produced for one call (or one tight sequence of calls): it owns a clone
//! of the shared reqwest connection pool, the base URL, and an optional bearer token.
//!
//! Every response goes through the same interpretation: 2xx bodies are decoded with
//! path-aware errors, non-2xx bodies become [`ApiError::Http`] with a best-effort message,
//! and transport failures become [`ApiError::Network`].

// crates.io
use reqwest::{
	Body, RequestBuilder, Response, StatusCode,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::{BearerToken, Session, TokenSource, UserId},
	config::Settings,
	error::ConfigError,
	obs::{self, CallKind},
};

/// Successful upstream response relayed without reshaping.
#[derive(Clone, Debug, PartialEq)]
pub struct Relayed {
	/// Upstream HTTP status (2xx).
	pub status: u16,
	/// Upstream JSON body; `Value::Null` when the body was empty.
	pub body: Value,
}

/// HTTP client bound to the backend base URL and, optionally, a bearer token.
///
/// Construction never fails. A client without a token omits the `Authorization` header and
/// is suitable for public endpoints; calls that need a user fail with
/// [`ApiError::Unauthenticated`] before touching the network.
#[derive(Clone)]
pub struct ApiClient {
	http: ReqwestClient,
	base_url: Url,
	token: Option<BearerToken>,
	user_id: Option<UserId>,
}
impl ApiClient {
	/// Builds a client with its own connection pool.
	pub fn new(base_url: Url, token: Option<BearerToken>, user_id: Option<UserId>) -> Self {
		Self::with_http_client(ReqwestClient::default(), base_url, token, user_id)
	}

	/// Builds a client that reuses an existing reqwest pool.
	pub fn with_http_client(
		http: ReqwestClient,
		base_url: Url,
		token: Option<BearerToken>,
		user_id: Option<UserId>,
	) -> Self {
		Self { http, base_url, token, user_id }
	}

	/// Builds a client carrying a verified session's credentials.
	pub fn for_session(http: ReqwestClient, base_url: Url, session: &Session) -> Self {
		Self::with_http_client(
			http,
			base_url,
			Some(session.token.clone()),
			Some(session.user_id.clone()),
		)
	}

	/// Backend base URL.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// User the token was issued to, if any.
	pub fn user_id(&self) -> Option<&UserId> {
		self.user_id.as_ref()
	}

	/// Returns `true` when a bearer token is attached.
	pub fn is_authenticated(&self) -> bool {
		self.token.is_some()
	}

	/// Shared reqwest pool.
	pub fn http_client(&self) -> &ReqwestClient {
		&self.http
	}

	/// Returns the signed-in user or [`ApiError::Unauthenticated`].
	pub fn require_user(&self) -> Result<&UserId, ApiError> {
		match (&self.token, &self.user_id) {
			(Some(_), Some(user)) => Ok(user),
			_ => Err(ApiError::Unauthenticated),
		}
	}

	/// Resolves a backend path against the base URL.
	pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
		self.base_url
			.join(path.trim_start_matches('/'))
			.map_err(|e| ApiError::Unknown { cause: format!("invalid endpoint `{path}`: {e}") })
	}

	/// `GET` a backend path and decode the JSON response.
	pub async fn get<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError>
	where
		T: DeserializeOwned,
	{
		let builder = self.request(Method::GET, path)?.query(query);

		self.execute(builder, "get").await
	}

	/// `POST` a JSON body to a backend path and decode the JSON response.
	pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		let builder = with_json(self.request(Method::POST, path)?, body)?;

		self.execute(builder, "post").await
	}

	/// `PUT` a JSON body to a backend path and decode the JSON response.
	pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		let builder = with_json(self.request(Method::PUT, path)?, body)?;

		self.execute(builder, "put").await
	}

	/// `DELETE` a backend path and decode the (possibly empty) JSON response.
	pub async fn delete<T>(&self, path: &str) -> Result<T, ApiError>
	where
		T: DeserializeOwned,
	{
		let builder = self.request(Method::DELETE, path)?;

		self.execute(builder, "delete").await
	}

	/// Sends one request and returns the upstream status + JSON body untouched.
	///
	/// Used by proxy routes that relay responses verbatim. Non-2xx statuses still surface
	/// as [`ApiError::Http`] so error reshaping stays uniform.
	pub async fn relay(
		&self,
		method: Method,
		path: &str,
		body: Option<&Value>,
	) -> Result<Relayed, ApiError> {
		let mut builder = self.request(method, path)?;

		if let Some(body) = body {
			builder = with_json(builder, body)?;
		}

		obs::observe(CallKind::Backend, "relay", async move {
			let response = builder.send().await?;
			let status = response.status();
			let bytes = read_body(response).await?;

			if !status.is_success() {
				return Err(ApiError::from_response(status.as_u16(), &bytes));
			}

			Ok(Relayed { status: status.as_u16(), body: decode(status, &bytes)? })
		})
		.await
	}

	/// Uploads raw bytes to an absolute URL (pre-signed storage URL).
	///
	/// No `Authorization` header is attached; the signature lives in the URL.
	pub async fn put_bytes(
		&self,
		url: Url,
		content_type: &str,
		bytes: Vec<u8>,
	) -> Result<(), ApiError> {
		self.put_body(url, content_type, bytes.into()).await
	}

	/// Streams a body to an absolute URL; see [`ApiClient::put_bytes`].
	pub async fn put_body(&self, url: Url, content_type: &str, body: Body) -> Result<(), ApiError> {
		let builder = self.http.put(url).header(CONTENT_TYPE, content_type).body(body);

		obs::observe(CallKind::Storage, "put_body", async move {
			let response = builder.send().await?;
			let status = response.status();

			if status.is_success() {
				Ok(())
			} else {
				let bytes = read_body(response).await?;

				Err(ApiError::from_response(status.as_u16(), &bytes))
			}
		})
		.await
	}

	fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
		let url = self.endpoint(path)?;
		let builder = self.http.request(method, url);

		Ok(match &self.token {
			Some(token) => builder.header(AUTHORIZATION, token.authorization()?),
			None => builder,
		})
	}

	async fn execute<T>(&self, builder: RequestBuilder, stage: &'static str) -> Result<T, ApiError>
	where
		T: DeserializeOwned,
	{
		obs::observe(CallKind::Backend, stage, async move {
			let response = builder.send().await?;

			interpret(response).await
		})
		.await
	}
}
impl Debug for ApiClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.base_url.as_str())
			.field("user_id", &self.user_id)
			.field("token_set", &self.token.is_some())
			.finish()
	}
}

/// Produces [`ApiClient`]s bound to one backend base URL.
#[derive(Clone)]
pub struct ApiClientFactory {
	http: ReqwestClient,
	base_url: Url,
	tokens: Arc<dyn TokenSource>,
}
impl ApiClientFactory {
	/// Creates a factory for `base_url` that asks `tokens` for credentials.
	pub fn new(base_url: Url, tokens: Arc<dyn TokenSource>) -> Self {
		Self { http: ReqwestClient::default(), base_url, tokens }
	}

	/// Creates a factory whose base URL comes from configuration (resolved once, here).
	pub fn from_settings(
		settings: &Settings,
		tokens: Arc<dyn TokenSource>,
	) -> Result<Self, ConfigError> {
		Ok(Self::new(settings.backend_base_url()?, tokens))
	}

	/// Replaces the reqwest pool shared by every produced client.
	pub fn with_http_client(mut self, http: ReqwestClient) -> Self {
		self.http = http;

		self
	}

	/// Backend base URL.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Builds a client carrying the token current at this instant.
	///
	/// When the source yields nothing the client is still produced, without an
	/// `Authorization` header.
	pub async fn client(&self) -> ApiClient {
		match self.tokens.fetch_current_token().await {
			Some(token) => ApiClient::with_http_client(
				self.http.clone(),
				self.base_url.clone(),
				Some(token.value),
				Some(token.user_id),
			),
			None => self.public_client(),
		}
	}

	/// Builds a client for public endpoints without consulting the token source.
	pub fn public_client(&self) -> ApiClient {
		ApiClient::with_http_client(self.http.clone(), self.base_url.clone(), None, None)
	}
}
impl Debug for ApiClientFactory {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClientFactory").field("base_url", &self.base_url.as_str()).finish()
	}
}

/// Interprets a response: 2xx decodes into `T`, anything else becomes [`ApiError::Http`].
pub async fn interpret<T>(response: Response) -> Result<T, ApiError>
where
	T: DeserializeOwned,
{
	let status = response.status();
	let bytes = read_body(response).await?;

	if !status.is_success() {
		return Err(ApiError::from_response(status.as_u16(), &bytes));
	}

	decode(status, &bytes)
}

fn decode<T>(status: StatusCode, bytes: &[u8]) -> Result<T, ApiError>
where
	T: DeserializeOwned,
{
	let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) { b"null" } else { bytes };
	let mut deserializer = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|err| ApiError::Decode {
		path: err.path().to_string(),
		message: err.inner().to_string(),
		status: status.as_u16(),
	})
}

async fn read_body(response: Response) -> Result<Vec<u8>, ApiError> {
	Ok(response.bytes().await?.to_vec())
}

fn with_json<B>(builder: RequestBuilder, body: &B) -> Result<RequestBuilder, ApiError>
where
	B: ?Sized + Serialize,
{
	let payload = serde_json::to_vec(body)
		.map_err(|e| ApiError::Unknown { cause: format!("request body serialization: {e}") })?;

	Ok(builder.header(CONTENT_TYPE, "application/json").body(payload))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::AnonymousTokenSource;

	fn base() -> Url {
		Url::parse("https://api.example.com/v1/").expect("Base URL fixture should parse.")
	}

	#[test]
	fn endpoint_joins_relative_to_base_path() {
		let client = ApiClient::new(base(), None, None);

		assert_eq!(
			client.endpoint("/providers/3").expect("Endpoint should resolve.").as_str(),
			"https://api.example.com/v1/providers/3"
		);
	}

	#[test]
	fn unauthenticated_client_requires_user() {
		let client = ApiClient::new(base(), None, None);

		assert!(!client.is_authenticated());
		assert!(matches!(client.require_user(), Err(ApiError::Unauthenticated)));

		let user = UserId::new("user_1").expect("User fixture should be valid.");
		let client = ApiClient::new(base(), Some(BearerToken::new("t")), Some(user.clone()));

		assert_eq!(client.require_user().expect("Token + user should authenticate."), &user);
	}

	#[test]
	fn decode_reports_path_of_mismatch() {
		#[derive(Debug, Deserialize)]
		struct Payload {
			#[allow(dead_code)]
			items: Vec<u32>,
		}

		let err = decode::<Payload>(StatusCode::OK, br#"{"items":[1,"two"]}"#)
			.expect_err("Mismatched element should fail to decode.");

		assert!(matches!(
			err,
			ApiError::Decode { ref path, status: 200, .. } if path == "items[1]"
		));
		decode::<()>(StatusCode::NO_CONTENT, b"").expect("Empty body should decode as unit.");
	}

	#[tokio::test]
	async fn factory_without_token_builds_public_client() {
		let factory = ApiClientFactory::new(base(), Arc::new(AnonymousTokenSource));
		let client = factory.client().await;

		assert!(!client.is_authenticated());
		assert_eq!(client.base_url(), factory.base_url());
	}
}
