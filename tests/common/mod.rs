//! Common test utilities for integration tests

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pronoun_cache::{
    DatabaseConfig, DomainError, DomainResult, InMemoryKeyValueStore, KeyValueStore,
    MockPronounSource, Resolver,
};
use tempfile::TempDir;

/// Quiescence window used by resolver tests; time is paused, so it only
/// needs to be non-zero.
pub const WINDOW: Duration = Duration::from_millis(20);

#[allow(dead_code)]
pub type TestResolver = Resolver<MockPronounSource, InMemoryKeyValueStore>;

/// Resolver over a mock source and a volatile store.
#[allow(dead_code)]
pub fn mock_resolver() -> (Arc<MockPronounSource>, TestResolver) {
    let source = Arc::new(MockPronounSource::new());
    let storage = Arc::new(InMemoryKeyValueStore::new());
    (source.clone(), Resolver::new(source, storage, WINDOW))
}

/// Create a temporary test database
///
/// Returns the directory guard, the database file path and a config pointing at it.
#[allow(dead_code)]
pub fn temp_database() -> (TempDir, PathBuf, DatabaseConfig) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("overrides.db");
    let config = DatabaseConfig {
        path: db_path.display().to_string(),
        ..DatabaseConfig::default()
    };
    (dir, db_path, config)
}

/// Setup test logging
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Volatile store whose reads and writes can be switched to fail.
#[allow(dead_code)]
#[derive(Default)]
pub struct UnreliableStore {
    inner: InMemoryKeyValueStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

#[allow(dead_code)]
impl UnreliableStore {
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, op: &str) -> DomainResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(DomainError::StorageError(format!("{op} unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for UnreliableStore {
    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        Self::check(&self.fail_reads, "read")?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> DomainResult<()> {
        Self::check(&self.fail_writes, "write")?;
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> DomainResult<()> {
        Self::check(&self.fail_writes, "write")?;
        self.inner.delete(key).await
    }

    async fn delete_many(&self, keys: &[String]) -> DomainResult<()> {
        Self::check(&self.fail_writes, "write")?;
        self.inner.delete_many(keys).await
    }
}
