//! Durable key-value storage port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// Minimal string key-value store used to persist overrides.
///
/// Values are opaque strings; callers encode records as JSON.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`, if any.
    async fn get(&self, key: &str) -> DomainResult<Option<String>>;

    /// Insert or replace the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> DomainResult<()>;

    /// Delete `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> DomainResult<()>;

    /// Delete every key in `keys`.
    async fn delete_many(&self, keys: &[String]) -> DomainResult<()>;
}
