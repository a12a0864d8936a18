//! SQLite connection pool setup.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::utils::errors::RouteResult;

/// Embedded schema, applied idempotently on startup.
const SCHEMA: &str = include_str!("schema.sql");

/// Create a connection pool for the route store.
///
/// A single connection is enough for one interactive editing session, keeps
/// in-memory databases coherent, and serializes saves at the pool level.
pub async fn create_pool(config: &DatabaseConfig) -> RouteResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    info!(url = %config.url, "route store pool created");
    Ok(pool)
}

/// Apply the schema. Every statement is `IF NOT EXISTS`, so this is safe to
/// run on an already-initialized store.
pub async fn init_schema(pool: &SqlitePool) -> RouteResult<()> {
    for statement in SCHEMA.split(';') {
        let statement = statement.trim();
        if !statement.is_empty() {
            sqlx::query(statement).execute(pool).await?;
        }
    }
    Ok(())
}
