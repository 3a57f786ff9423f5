use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates the PostgreSQL pool backing the profile store.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    info!("Connecting to PostgreSQL (max_connections={max_connections})...");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("Failed to connect to the profile database")?;

    sqlx::query(include_str!("../migrations/001_user_profiles.sql"))
        .execute(&pool)
        .await
        .context("Failed to prepare the user_profiles table")?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}
