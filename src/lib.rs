//! pronoun-cache - batched, override-aware pronoun resolution
//!
//! Resolves the pronouns of entities (users) identified by opaque string ids.
//! Locally persisted overrides win over remote answers, concurrent requests
//! for the same id share one pending slot, and distinct ids requested within
//! a short quiescence window go out as a single bulk lookup.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and the storage/source ports
//! - **Service Layer** (`services`): override store, coalescer, dispatcher, resolver
//! - **Adapters** (`adapters`): SQLite and in-memory stores, PronounDB client, mock source
//! - **Infrastructure Layer** (`infrastructure`): configuration loading and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pronoun_cache::{EntityId, InMemoryKeyValueStore, MockPronounSource, Resolver};
//!
//! #[tokio::main]
//! async fn main() {
//!     let resolver = Resolver::new(
//!         Arc::new(MockPronounSource::new()),
//!         Arc::new(InMemoryKeyValueStore::new()),
//!         Duration::from_millis(20),
//!     );
//!     let pronouns = resolver.resolve(&EntityId::from("1234")).await;
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::{InMemoryKeyValueStore, MockPronounSource, PronounDbClient, SqliteKeyValueStore};
pub use domain::models::{
    Config, DatabaseConfig, DisplayConfig, EntityId, LoggingConfig, LookupConfig, OverrideRecord,
    PronounCode, PronounStyle,
};
pub use domain::ports::{KeyValueStore, PronounSource};
pub use domain::{DomainError, DomainResult, LookupError};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{display_text, format_pronouns, should_display, Resolver};
