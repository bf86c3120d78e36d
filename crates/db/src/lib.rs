//! Persistence layer for the Teklif quote-pricing engine.
//!
//! Exposes a connection-pool constructor, embedded migrations, entity
//! models, repositories, and the price-calculation orchestration that runs
//! inside a caller-supplied transaction.

use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod models;
pub mod pricing;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
