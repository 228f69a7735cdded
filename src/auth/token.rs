//! Bearer token material and the sources that mint it.

pub mod bearer;
pub mod source;
