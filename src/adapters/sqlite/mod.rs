//! SQLite persistence for override records.
//!
//! The database only ever holds the `kv_store` table behind
//! [`SqliteKeyValueStore`]; opening it always applies pending migrations.

pub mod kv_store;
pub mod migrations;

pub use kv_store::SqliteKeyValueStore;
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::debug;

use crate::domain::models::DatabaseConfig;

/// How long a writer waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Failed to create database directory {path}: {source}")]
    Directory {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to open database: {0}")]
    Connection(#[source] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
}

/// Open (creating if needed) the override database described by `config`.
pub async fn open_database(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    let path = Path::new(&config.path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| DatabaseError::Directory {
            path: parent.display().to_string(),
            source,
        })?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .map_err(DatabaseError::Connection)?;

    migrate(pool, &config.path).await
}

/// Migrated database that lives as long as the returned pool.
///
/// Every `:memory:` connection is a separate database, so the pool keeps
/// exactly one connection open for its whole life.
pub async fn open_in_memory_database() -> Result<SqlitePool, DatabaseError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(SqliteConnectOptions::new().filename(":memory:"))
        .await
        .map_err(DatabaseError::Connection)?;

    migrate(pool, ":memory:").await
}

async fn migrate(pool: SqlitePool, location: &str) -> Result<SqlitePool, DatabaseError> {
    let applied = Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await?;
    debug!(location, applied, "override database ready");
    Ok(pool)
}
