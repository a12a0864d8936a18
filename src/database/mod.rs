//! Database access: pool construction and schema bootstrap.

pub mod connection;

pub use connection::{create_pool, init_schema};
