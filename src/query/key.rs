//! Query keys: a resource tag plus an ordered parameter map.

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, UserId},
};

/// Resource family a cached query belongs to.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
	Providers,
	Provider,
	Search,
	Categories,
	ProviderReviews,
	UserReviews,
	Bookmarks,
	BookmarkStatus,
	UserProfile,
	MyProvider,
}
impl Resource {
	/// Stable snake_case label used in keys, logs, and spans.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Providers => "providers",
			Self::Provider => "provider",
			Self::Search => "search",
			Self::Categories => "categories",
			Self::ProviderReviews => "provider_reviews",
			Self::UserReviews => "user_reviews",
			Self::Bookmarks => "bookmarks",
			Self::BookmarkStatus => "bookmark_status",
			Self::UserProfile => "user_profile",
			Self::MyProvider => "my_provider",
		}
	}
}
impl Display for Resource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Identifies one cache entry.
///
/// Two keys are equal when they name the same resource with the same parameters. Parameter
/// order never matters because parameters live in a [`BTreeMap`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
	resource: Resource,
	params: BTreeMap<String, String>,
}
impl QueryKey {
	/// Key for `resource` with no parameters.
	pub fn new(resource: Resource) -> Self {
		Self { resource, params: BTreeMap::new() }
	}

	/// Adds or replaces one parameter.
	pub fn with(mut self, param: impl Into<String>, value: impl ToString) -> Self {
		self.params.insert(param.into(), value.to_string());

		self
	}

	/// Resource family.
	pub fn resource(&self) -> Resource {
		self.resource
	}

	/// Parameter value, if set.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.get(name).map(String::as_str)
	}

	/// Returns `true` when `self` has the filter's resource and every filter parameter.
	pub fn matches(&self, filter: &QueryKey) -> bool {
		self.resource == filter.resource
			&& filter.params.iter().all(|(k, v)| self.params.get(k) == Some(v))
	}

	/// `provider[provider_id=…]`
	pub fn provider(id: ProviderId) -> Self {
		Self::new(Resource::Provider).with("provider_id", id)
	}

	/// `providers[…filter]`; the pairs are the list filter's non-empty query parameters.
	pub fn providers<'a>(filter: impl IntoIterator<Item = (&'a str, String)>) -> Self {
		filter.into_iter().fold(Self::new(Resource::Providers), |key, (k, v)| key.with(k, v))
	}

	/// `search[…params]`
	pub fn search<'a>(params: impl IntoIterator<Item = (&'a str, String)>) -> Self {
		params.into_iter().fold(Self::new(Resource::Search), |key, (k, v)| key.with(k, v))
	}

	/// `categories`
	pub fn categories() -> Self {
		Self::new(Resource::Categories)
	}

	/// `provider_reviews[provider_id=…]`
	pub fn provider_reviews(id: ProviderId) -> Self {
		Self::new(Resource::ProviderReviews).with("provider_id", id)
	}

	/// `user_reviews[user_id=…]`
	pub fn user_reviews(user: &UserId) -> Self {
		Self::new(Resource::UserReviews).with("user_id", user)
	}

	/// `bookmarks[user_id=…]`
	pub fn bookmarks(user: &UserId) -> Self {
		Self::new(Resource::Bookmarks).with("user_id", user)
	}

	/// `bookmark_status[provider_id=…,user_id=…]`
	pub fn bookmark_status(user: &UserId, provider: ProviderId) -> Self {
		Self::new(Resource::BookmarkStatus).with("user_id", user).with("provider_id", provider)
	}

	/// `user_profile[user_id=…]`
	pub fn user_profile(user: &UserId) -> Self {
		Self::new(Resource::UserProfile).with("user_id", user)
	}

	/// `my_provider[user_id=…]`
	pub fn my_provider(user: &UserId) -> Self {
		Self::new(Resource::MyProvider).with("user_id", user)
	}
}
impl Display for QueryKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.resource.as_str())?;

		if self.params.is_empty() {
			return Ok(());
		}

		f.write_str("[")?;

		for (i, (k, v)) in self.params.iter().enumerate() {
			if i > 0 {
				f.write_str(",")?;
			}

			write!(f, "{k}={v}")?;
		}

		f.write_str("]")
	}
}
