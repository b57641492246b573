pub mod games;
pub mod models;
pub mod players;
pub mod stats;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// Get the path to the database file using platform-specific data directory
pub fn get_db_path() -> Result<PathBuf> {
    let mut path = dirs::data_dir()
        .context("Unable to determine data directory for your platform")?;

    path.push("game-ledger");

    std::fs::create_dir_all(&path)
        .context("Failed to create game-ledger data directory")?;

    path.push("ledger.db");
    Ok(path)
}

/// Default connection URL, pointing at the platform data directory
pub fn default_database_url() -> Result<String> {
    Ok(format!("sqlite:{}", get_db_path()?.display()))
}

/// Create a connection pool to the SQLite database and apply migrations
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid database url: {database_url}"))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    migrate(&pool).await?;

    info!(database_url, max_connections, "database ready");
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    Ok(())
}

/// Single-connection in-memory pool. The connection is never recycled, since
/// an in-memory database disappears with its connection.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();

    migrate(&pool).await.unwrap();
    pool
}
