use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseConfig;

/// Creates and returns a PostgreSQL connection pool.
/// Callers waiting on an exhausted pool give up after `acquire_timeout`.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(config.connect_options()?)
        .await
        .context("failed to connect to PostgreSQL")?;

    info!(
        "PostgreSQL connection pool established (max {} connections)",
        config.max_connections
    );
    Ok(pool)
}

/// Applies the embedded schema migrations and seed data.
/// Safe to run on every startup: applied migrations are skipped and the
/// seed inserts are guarded.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("failed to apply database migrations")?;
    info!("Database schema and seed data are up to date");
    Ok(())
}
