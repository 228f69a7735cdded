//! Identity-domain identifiers, bearer tokens, token sources, and session checks.

pub mod id;
pub mod session;
pub mod token;

pub use id::*;
pub use session::*;
pub use token::{bearer::*, source::*};
