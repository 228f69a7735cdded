//! Authenticated API gateway for a provider directory: per-request bearer tokens, a
//! deduplicating query cache with stale-while-revalidate reads, and uniform proxy routes with
//! webhook verification.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod hooks;
pub mod http;
pub mod obs;
pub mod proxy;
pub mod query;
pub mod webhook;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError, Method};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{ApiError, Error, Result};
}

pub use reqwest;
pub use url;
// The binary owns these; the library only has to tolerate them.
use {color_eyre as _, tracing_subscriber as _};
#[cfg(test)] use httpmock as _;
