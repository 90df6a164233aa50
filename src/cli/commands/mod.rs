//! CLI command implementations.

pub mod override_cmd;
pub mod resolve;

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::adapters::sqlite::open_database;
use crate::adapters::{PronounDbClient, SqliteKeyValueStore};
use crate::domain::models::Config;
use crate::services::Resolver;

/// Resolver wired to PronounDB and the on-disk override database.
pub type CliResolver = Resolver<PronounDbClient, SqliteKeyValueStore>;

/// Build the resolver every command runs against.
pub async fn build_resolver(config: &Config) -> Result<CliResolver> {
    let pool = open_database(&config.database)
        .await
        .with_context(|| format!("Failed to open override database at {}", config.database.path))?;

    let client = PronounDbClient::new(&config.lookup).context("Failed to build PronounDB client")?;

    Ok(Resolver::from_config(
        Arc::new(client),
        Arc::new(SqliteKeyValueStore::new(pool)),
        &config.lookup,
    ))
}
