//! Error taxonomy for the route design engine.
//!
//! Three families: validation errors are caught before any storage operation
//! and leave no partial effect; graph-consistency errors are structurally
//! prevented by the graph model but re-checked at save time and abort the
//! transaction; storage errors always roll back the enclosing transaction.
//! "No route yet for this material" is a valid empty state, never an error.

use thiserror::Error;

use crate::models::NodeKey;

/// Errors surfaced by the route engine.
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("route name is required")]
    MissingRouteName,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unknown node {0}")]
    UnknownNode(NodeKey),

    #[error("link references node {0} that is not part of the route")]
    ConstraintViolation(NodeKey),

    #[error("process template {0} not found")]
    TemplateNotFound(i64),
}

/// Result alias used throughout the engine.
pub type RouteResult<T> = Result<T, RouteError>;

/// Helper for building validation errors.
pub fn validation_error(message: impl Into<String>) -> RouteError {
    RouteError::Validation(message.into())
}
