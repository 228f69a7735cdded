//! Typed backend endpoints and the wire-to-view-model mapping.
//!
//! Each submodule extends [`ApiClient`](crate::http::ApiClient) with the calls for one
//! resource. Methods return view models; the backend's wire shapes stay in [`models`].

pub mod models;

mod bookmarks;
mod contact;
mod hero_image;
mod providers;
mod reviews;
mod users;

pub use bookmarks::*;
pub use contact::*;
pub use hero_image::*;
pub use models::*;
pub use providers::*;
pub use reviews::*;
pub use users::*;
