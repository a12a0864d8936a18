//! Runtime configuration.

pub mod database;

pub use database::DatabaseConfig;
