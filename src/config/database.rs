//! Database configuration.

use std::env;

/// Where the route store lives. The tool ships with an embedded SQLite file
/// next to the executable; `DATABASE_URL` overrides it.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

impl DatabaseConfig {
    pub const DEFAULT_URL: &'static str = "sqlite://process_route.db";

    /// Read the configuration from the environment, loading `.env` first.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            url: env::var("DATABASE_URL").unwrap_or_else(|_| Self::DEFAULT_URL.to_string()),
        }
    }

    /// In-memory store, used by tests and throwaway sessions.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
