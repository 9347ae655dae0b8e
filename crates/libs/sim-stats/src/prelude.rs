//! Common types and utilities.

/// Statistics error type.
pub use crate::error::Error;

/// Statistics result type.
pub type Result<T> = core::result::Result<T, Error>;
