//! Configuration lookup for the gateway.
//!
//! Values come from a [`ConfigSource`]. The production source reads the process environment
//! at call time, so secrets rotated in the environment are picked up by the next request.
//! The backend base URL is the one exception: it is resolved once when the client factory or
//! proxy state is built and never varies per call.

// std
use std::net::SocketAddr;
// crates.io
use url::Origin;
// self
use crate::{_prelude::*, error::ConfigError};

/// Environment keys understood by the gateway.
pub mod keys {
	/// Base URL of the backend REST service.
	pub const BACKEND_API_URL: &str = "BACKEND_API_URL";
	/// Shared secret used to verify identity-provider webhooks (`whsec_…`).
	pub const IDENTITY_WEBHOOK_SECRET: &str = "IDENTITY_WEBHOOK_SECRET";
	/// Access token for the reverse-geocoding provider.
	pub const MAPBOX_ACCESS_TOKEN: &str = "MAPBOX_ACCESS_TOKEN";
	/// Base URL of the reverse-geocoding provider.
	pub const MAPBOX_API_URL: &str = "MAPBOX_API_URL";
	/// Browser maps key exposed through the public config route.
	pub const MAPS_API_KEY: &str = "MAPS_API_KEY";
	/// Public base URL for objects in the hero-image bucket.
	pub const STORAGE_PUBLIC_URL: &str = "STORAGE_PUBLIC_URL";
	/// Origin (`scheme://host[:port]`) that pre-signed upload URLs must point at.
	pub const STORAGE_UPLOAD_ORIGIN: &str = "STORAGE_UPLOAD_ORIGIN";
	/// Listener address for the gateway binary.
	pub const GATEWAY_BIND_ADDR: &str = "GATEWAY_BIND_ADDR";
}

const DEFAULT_MAPBOX_API_URL: &str = "https://api.mapbox.com";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Key/value lookup consulted by [`Settings`].
pub trait ConfigSource
where
	Self: Send + Sync,
{
	/// Returns the raw value for `key`, if any.
	fn get(&self, key: &str) -> Option<String>;
}

/// Reads the process environment on every lookup.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvSource;
impl ConfigSource for EnvSource {
	fn get(&self, key: &str) -> Option<String> {
		std::env::var(key).ok()
	}
}

/// Fixed in-memory source used by tests and embedded setups.
#[derive(Clone, Debug, Default)]
pub struct MapSource(HashMap<String, String>);
impl MapSource {
	/// Adds or replaces a value.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.0.insert(key.into(), value.into());

		self
	}
}
impl ConfigSource for MapSource {
	fn get(&self, key: &str) -> Option<String> {
		self.0.get(key).cloned()
	}
}

/// Typed accessors over a shared [`ConfigSource`].
#[derive(Clone)]
pub struct Settings {
	source: Arc<dyn ConfigSource>,
}
impl Settings {
	/// Wraps the provided source.
	pub fn new(source: impl 'static + ConfigSource) -> Self {
		Self { source: Arc::new(source) }
	}

	/// Settings backed by the process environment.
	pub fn from_env() -> Self {
		Self::new(EnvSource)
	}

	/// Returns the trimmed value for `key`; blank values count as absent.
	pub fn get(&self, key: &'static str) -> Option<String> {
		self.source.get(key).map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
	}

	/// Returns the value for `key` or [`ConfigError::Missing`].
	pub fn require(&self, key: &'static str) -> Result<String, ConfigError> {
		self.get(key).ok_or(ConfigError::Missing { key })
	}

	/// Backend base URL, normalized to end with `/` so relative joins keep its path.
	pub fn backend_base_url(&self) -> Result<Url, ConfigError> {
		let raw = self.require(keys::BACKEND_API_URL)?;

		base_url(keys::BACKEND_API_URL, &raw)
	}

	/// Reverse-geocoding base URL, defaulting to the public Mapbox API.
	pub fn geocoding_base_url(&self) -> Result<Url, ConfigError> {
		let raw = self.get(keys::MAPBOX_API_URL).unwrap_or_else(|| DEFAULT_MAPBOX_API_URL.into());

		base_url(keys::MAPBOX_API_URL, &raw)
	}

	/// Origin that `/api/upload` may forward to; `None` disables uploads.
	pub fn storage_upload_origin(&self) -> Result<Option<Origin>, ConfigError> {
		let Some(raw) = self.get(keys::STORAGE_UPLOAD_ORIGIN) else {
			return Ok(None);
		};
		let url = Url::parse(&raw)
			.map_err(|source| ConfigError::InvalidUrl {
				key: keys::STORAGE_UPLOAD_ORIGIN,
				source,
			})?;

		Ok(Some(url.origin()))
	}

	/// Listener address for the binary.
	pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
		let value = self.get(keys::GATEWAY_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.into());

		value.parse().map_err(|source| ConfigError::InvalidBindAddr { value, source })
	}
}
impl Debug for Settings {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("Settings(..)")
	}
}

/// Parses `raw` as a base URL whose path always ends with `/`.
pub fn base_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
	let mut url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { key, source })?;

	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	Ok(url)
}
