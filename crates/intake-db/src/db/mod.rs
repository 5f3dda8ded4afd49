//! Database repositories for data access layer
//!
//! `submission` holds the `passports` table repository, `transaction` the
//! helper that keeps multi-row writes atomic.

pub mod submission;
pub mod transaction;

use intake_core::AppError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Connection pool sizing.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

/// Open the PostgreSQL connection pool.
///
/// The schema is managed outside this crate; see [`submission`] for the
/// expected layout of the `passports` table.
pub async fn connect_pool(database_url: &str, settings: &PoolSettings) -> Result<PgPool, AppError> {
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await?;

    tracing::info!(
        max_connections = settings.max_connections,
        "Database connected successfully"
    );

    Ok(pool)
}
