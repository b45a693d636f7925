//! Database bootstrap: connect with retries, then run embedded migrations.

use anyhow::{Context, Result};
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;

/// Migrations embedded at compile time from `./migrations`.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Open the pool, retrying while the database is still starting up.
///
/// Each attempt connects and runs `SELECT 1`; failures are logged and the
/// next attempt starts after `db_retry_interval`.
pub async fn connect_with_retry(config: &Config) -> Result<PgPool> {
    let mut attempt = 1;
    loop {
        match try_connect(config).await {
            Ok(pool) => {
                tracing::info!(attempt, "Database connected");
                return Ok(pool);
            }
            Err(e) if attempt < config.db_max_retries => {
                tracing::warn!(
                    attempt,
                    max_retries = config.db_max_retries,
                    error = %e,
                    "Database not ready, retrying"
                );
                tokio::time::sleep(config.db_retry_interval).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to connect to database after {} attempts", attempt)
                });
            }
        }
    }
}

async fn try_connect(config: &Config) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::query("SELECT 1").execute(&pool).await?;
    Ok(pool)
}

/// Apply pending migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    tracing::info!("Running database migrations...");
    MIGRATOR
        .run(pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");
    Ok(())
}
