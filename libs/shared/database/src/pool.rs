use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use shared_config::AppConfig;

pub type DbPool = SqlitePool;

/// Opens the pool described by `DATABASE_URL`. Foreign keys are enforced on
/// every connection the pool hands out.
pub async fn connect(config: &AppConfig) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database_max_connections.max(1))
        .connect_with(options)
        .await?;

    info!(
        "Connected to {} (schema {})",
        config.database_url, config.database_schema
    );
    Ok(pool)
}

/// Single-connection in-memory database. The connection never idles out, so
/// the data lives as long as the pool.
pub async fn connect_in_memory() -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
}

pub async fn ping(pool: &DbPool) -> Result<(), sqlx::Error> {
    debug!("Pinging database");
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
