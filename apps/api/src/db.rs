use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Connects to PostgreSQL and brings the `interviews` and
/// `institutional_memory` tables up to date.
pub async fn connect_and_migrate(database_url: &str, max_connections: u32) -> Result<PgPool> {
    info!("Connecting to PostgreSQL (max {max_connections} connections)...");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to apply database migrations")?;

    info!("PostgreSQL ready, migrations applied");
    Ok(pool)
}
