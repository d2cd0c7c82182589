//! SQLite persistence gateway.
//!
//! Each table has a small repository module of free functions taking a
//! `&mut SqliteConnection`, so callers decide the transaction scope:
//! `pool.begin()` for mutations (commit explicitly, roll back on drop) or a
//! plain pooled connection for reads.

pub mod books;
pub mod feedback;
pub mod jobs;
pub mod logs;
pub mod settings;
pub mod tropes;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::AppResult;

/// Creates a SQLite connection pool, creating the database file if needed.
///
/// In-memory URLs get a single, never-recycled connection: every SQLite
/// memory connection is its own database.
pub async fn create_pool(database_url: &str, max_connections: u32) -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?
    };

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn migrate(pool: &SqlitePool) -> AppResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Fresh, migrated in-memory database
pub async fn connect_in_memory() -> AppResult<SqlitePool> {
    let pool = create_pool("sqlite::memory:", 1).await?;
    migrate(&pool).await?;
    Ok(pool)
}
