//! Shared utilities: error types and save-time validation.

pub mod errors;
pub mod validation;

pub use errors::{RouteError, RouteResult};
