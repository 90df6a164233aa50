//! Durable pronoun overrides with a session-lifetime read mirror.
//!
//! Each override is stored as its own record (`override:<id>`) and every id
//! with a record is listed in a single index record, so clearing all
//! overrides never scans the store. Once a key has been read (or written)
//! the in-memory mirror is authoritative for it: every mutation goes through
//! this type and updates the mirror before returning.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{EntityId, OverrideRecord, OverrideSlot, PronounCode};
use crate::domain::ports::KeyValueStore;

use super::result_cache::ResultCache;

/// Storage key prefix for individual override records.
pub const OVERRIDE_KEY_PREFIX: &str = "override:";

/// Storage key of the index listing every overridden id.
pub const OVERRIDE_INDEX_KEY: &str = "override-index";

/// Storage key of the override record for `id`.
pub fn override_storage_key(id: &EntityId) -> String {
    format!("{OVERRIDE_KEY_PREFIX}{id}")
}

pub struct OverrideStore<K: KeyValueStore> {
    storage: Arc<K>,
    mirror: RwLock<HashMap<EntityId, OverrideSlot>>,
    results: Arc<ResultCache>,
    /// Serializes read-modify-write cycles on the index record.
    index_lock: Mutex<()>,
}

impl<K: KeyValueStore> OverrideStore<K> {
    pub fn new(storage: Arc<K>, results: Arc<ResultCache>) -> Self {
        Self {
            storage,
            mirror: RwLock::new(HashMap::new()),
            results,
            index_lock: Mutex::new(()),
        }
    }

    /// Override for `id`, reading storage only on the first query per key.
    pub async fn get(&self, id: &EntityId) -> DomainResult<Option<OverrideRecord>> {
        if let Some(slot) = self.get_now(id) {
            return Ok(slot.record());
        }

        let slot = match self.storage.get(&override_storage_key(id)).await? {
            Some(raw) => OverrideSlot::Present(serde_json::from_str(&raw)?),
            None => OverrideSlot::Absent,
        };
        debug!(entity_id = %id, ?slot, "primed override mirror");

        // A concurrent set/remove may have primed the key while we were reading;
        // its state is newer than what we read.
        let slot = *self
            .mirror
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id.clone())
            .or_insert(slot);
        Ok(slot.record())
    }

    /// Mirror state for `id` without touching storage; `None` if not yet primed.
    pub fn get_now(&self, id: &EntityId) -> Option<OverrideSlot> {
        self.mirror
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .copied()
    }

    /// Persist an override. `None` stores an explicit "no preference" record.
    ///
    /// The id is indexed before its record is written, so a record on disk is
    /// always reachable from `clear_all`. On any storage failure the key is
    /// unprimed and re-read on next access.
    pub async fn set(&self, id: &EntityId, value: Option<PronounCode>) -> DomainResult<()> {
        let record = OverrideRecord::from(value);
        let raw = serde_json::to_string(&record)?;

        self.index_insert(id)
            .await
            .inspect_err(|err| self.unprime(id, err))?;
        self.storage
            .set(&override_storage_key(id), &raw)
            .await
            .inspect_err(|err| self.unprime(id, err))?;

        self.prime(id, OverrideSlot::Present(record));
        info!(entity_id = %id, pronouns = ?record.value(), "override set");
        Ok(())
    }

    /// Delete the override for `id`. Returns whether one was indexed.
    ///
    /// The record goes first; an index entry without a record is harmless.
    pub async fn remove(&self, id: &EntityId) -> DomainResult<bool> {
        self.storage
            .delete(&override_storage_key(id))
            .await
            .inspect_err(|err| self.unprime(id, err))?;
        self.prime(id, OverrideSlot::Absent);

        let removed = self.index_remove(id).await?;
        info!(entity_id = %id, removed, "override removed");
        Ok(removed)
    }

    /// Delete every indexed override and the index itself.
    ///
    /// Returns the number of ids listed in the index before deletion.
    pub async fn clear_all(&self) -> DomainResult<usize> {
        let _guard = self.index_lock.lock().await;
        let index = self.read_index().await?;

        let mut keys: Vec<String> = index.iter().map(override_storage_key).collect();
        keys.push(OVERRIDE_INDEX_KEY.to_string());
        if let Err(err) = self.storage.delete_many(&keys).await {
            for id in &index {
                self.unprime(id, &err);
            }
            return Err(err);
        }

        for id in &index {
            self.prime(id, OverrideSlot::Absent);
        }
        info!(cleared = index.len(), "cleared all overrides");
        Ok(index.len())
    }

    /// Ids currently listed in the durable index.
    pub async fn list(&self) -> DomainResult<Vec<EntityId>> {
        Ok(self.read_index().await?.into_iter().collect())
    }

    fn prime(&self, id: &EntityId, slot: OverrideSlot) {
        self.mirror
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), slot);
        self.results.invalidate(id);
    }

    /// Forget what is known about `id` after a failed write left its durable
    /// state uncertain.
    fn unprime(&self, id: &EntityId, err: &DomainError) {
        self.mirror
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        self.results.invalidate(id);
        warn!(entity_id = %id, error = %err, "override write failed, mirror entry dropped");
    }

    async fn index_insert(&self, id: &EntityId) -> DomainResult<()> {
        let _guard = self.index_lock.lock().await;
        let mut index = self.read_index().await?;
        if index.insert(id.clone()) {
            self.write_index(&index).await?;
        }
        Ok(())
    }

    async fn index_remove(&self, id: &EntityId) -> DomainResult<bool> {
        let _guard = self.index_lock.lock().await;
        let mut index = self.read_index().await?;
        let removed = index.remove(id);
        if removed {
            self.write_index(&index).await?;
        }
        Ok(removed)
    }

    async fn read_index(&self) -> DomainResult<BTreeSet<EntityId>> {
        match self.storage.get(OVERRIDE_INDEX_KEY).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(BTreeSet::new()),
        }
    }

    async fn write_index(&self, index: &BTreeSet<EntityId>) -> DomainResult<()> {
        self.storage
            .set(OVERRIDE_INDEX_KEY, &serde_json::to_string(index)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryKeyValueStore;
    use async_trait::async_trait;

    /// In-memory store that rejects writes and deletes of one chosen key.
    #[derive(Default)]
    struct RejectingStore {
        inner: InMemoryKeyValueStore,
        rejected: std::sync::Mutex<Option<String>>,
    }

    impl RejectingStore {
        fn reject(&self, key: Option<&str>) {
            *self.rejected.lock().unwrap() = key.map(str::to_string);
        }

        fn check(&self, key: &str) -> DomainResult<()> {
            if self.rejected.lock().unwrap().as_deref() == Some(key) {
                return Err(DomainError::StorageError(format!("write to {key} rejected")));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl KeyValueStore for RejectingStore {
        async fn get(&self, key: &str) -> DomainResult<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> DomainResult<()> {
            self.check(key)?;
            self.inner.set(key, value).await
        }

        async fn delete(&self, key: &str) -> DomainResult<()> {
            self.check(key)?;
            self.inner.delete(key).await
        }

        async fn delete_many(&self, keys: &[String]) -> DomainResult<()> {
            for key in keys {
                self.check(key)?;
            }
            self.inner.delete_many(keys).await
        }
    }

    fn rejecting_store() -> (Arc<RejectingStore>, Arc<ResultCache>, OverrideStore<RejectingStore>) {
        let storage = Arc::new(RejectingStore::default());
        let results = Arc::new(ResultCache::new());
        let overrides = OverrideStore::new(storage.clone(), results.clone());
        (storage, results, overrides)
    }

    fn store() -> (Arc<InMemoryKeyValueStore>, Arc<ResultCache>, OverrideStore<InMemoryKeyValueStore>) {
        let storage = Arc::new(InMemoryKeyValueStore::new());
        let results = Arc::new(ResultCache::new());
        let overrides = OverrideStore::new(storage.clone(), results.clone());
        (storage, results, overrides)
    }

    #[tokio::test]
    async fn test_get_primes_mirror_once() {
        let (storage, _, overrides) = store();
        let id = EntityId::from("7");
        storage.set("override:7", "\"sh\"").await.unwrap();

        assert_eq!(overrides.get_now(&id), None);
        assert_eq!(
            overrides.get(&id).await.unwrap(),
            Some(OverrideRecord::Set(PronounCode::SheHer))
        );

        // The mirror stays authoritative even if storage changes underneath.
        storage.delete("override:7").await.unwrap();
        assert_eq!(
            overrides.get(&id).await.unwrap(),
            Some(OverrideRecord::Set(PronounCode::SheHer))
        );
        assert_eq!(storage.read_count(), 1);
    }

    #[tokio::test]
    async fn test_absent_override_is_primed() {
        let (_, _, overrides) = store();
        let id = EntityId::from("8");
        assert_eq!(overrides.get(&id).await.unwrap(), None);
        assert_eq!(overrides.get_now(&id), Some(OverrideSlot::Absent));
    }

    #[tokio::test]
    async fn test_set_writes_record_and_index_idempotently() {
        let (storage, _, overrides) = store();
        let id = EntityId::from("1");

        overrides.set(&id, Some(PronounCode::HeHim)).await.unwrap();
        overrides.set(&id, None).await.unwrap();

        assert_eq!(storage.get("override:1").await.unwrap().as_deref(), Some("null"));
        assert_eq!(
            storage.get(OVERRIDE_INDEX_KEY).await.unwrap().as_deref(),
            Some("[\"1\"]")
        );
        assert_eq!(
            overrides.get_now(&id),
            Some(OverrideSlot::Present(OverrideRecord::Cleared))
        );
    }

    #[tokio::test]
    async fn test_set_invalidates_result_cache() {
        let (_, results, overrides) = store();
        let id = EntityId::from("1");
        results.insert(id.clone(), Some(PronounCode::TheyThem));

        overrides.set(&id, Some(PronounCode::HeHim)).await.unwrap();
        assert!(!results.contains(&id));
    }

    #[tokio::test]
    async fn test_remove() {
        let (storage, _, overrides) = store();
        let a = EntityId::from("a");
        let b = EntityId::from("b");
        overrides.set(&a, Some(PronounCode::Any)).await.unwrap();
        overrides.set(&b, Some(PronounCode::Ask)).await.unwrap();

        assert!(overrides.remove(&a).await.unwrap());
        assert!(!overrides.remove(&a).await.unwrap());
        assert_eq!(overrides.get_now(&a), Some(OverrideSlot::Absent));
        assert_eq!(storage.get("override:a").await.unwrap(), None);
        assert_eq!(overrides.list().await.unwrap(), vec![b]);
    }

    #[tokio::test]
    async fn test_clear_all_reports_index_length() {
        let (storage, _, overrides) = store();
        let a = EntityId::from("a");
        let b = EntityId::from("b");
        overrides.set(&a, Some(PronounCode::HeHim)).await.unwrap();
        overrides.set(&b, None).await.unwrap();

        assert_eq!(overrides.clear_all().await.unwrap(), 2);
        assert_eq!(storage.len().await, 0);
        assert_eq!(overrides.get(&a).await.unwrap(), None);
        assert_eq!(overrides.get(&b).await.unwrap(), None);
        assert_eq!(overrides.clear_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_record_propagates() {
        let (storage, _, overrides) = store();
        storage.set("override:x", "{not json").await.unwrap();
        let result = overrides.get(&EntityId::from("x")).await;
        assert!(matches!(
            result,
            Err(crate::domain::errors::DomainError::SerializationError(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_index_write_leaves_no_orphan_record() {
        let (storage, results, overrides) = rejecting_store();
        let id = EntityId::from("z");
        assert_eq!(overrides.get(&id).await.unwrap(), None);
        results.insert(id.clone(), Some(PronounCode::HeHim));

        storage.reject(Some(OVERRIDE_INDEX_KEY));
        assert!(overrides.set(&id, Some(PronounCode::SheHer)).await.is_err());

        assert_eq!(overrides.get_now(&id), None);
        assert!(!results.contains(&id));
        assert_eq!(storage.get("override:z").await.unwrap(), None);

        storage.reject(None);
        assert_eq!(overrides.clear_all().await.unwrap(), 0);
        let fresh = OverrideStore::new(storage.clone(), Arc::new(ResultCache::new()));
        assert_eq!(fresh.get(&id).await.unwrap(), None);
        assert_eq!(overrides.get(&id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_record_write_stays_clearable() {
        let (storage, _, overrides) = rejecting_store();
        let id = EntityId::from("z");
        overrides.set(&id, Some(PronounCode::HeHim)).await.unwrap();

        storage.reject(Some("override:z"));
        assert!(overrides.set(&id, Some(PronounCode::SheHer)).await.is_err());

        // Unprimed, so the next read reports what storage actually holds.
        assert_eq!(overrides.get_now(&id), None);
        assert_eq!(
            overrides.get(&id).await.unwrap(),
            Some(OverrideRecord::Set(PronounCode::HeHim))
        );

        storage.reject(None);
        assert_eq!(overrides.clear_all().await.unwrap(), 1);
        assert_eq!(storage.get("override:z").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_remove_unprimes_mirror() {
        let (storage, _, overrides) = rejecting_store();
        let id = EntityId::from("r");
        overrides.set(&id, Some(PronounCode::Any)).await.unwrap();

        storage.reject(Some("override:r"));
        assert!(overrides.remove(&id).await.is_err());
        assert_eq!(overrides.get_now(&id), None);

        // Record gone but index write rejected: the mirror still matches storage.
        storage.reject(Some(OVERRIDE_INDEX_KEY));
        assert!(overrides.remove(&id).await.is_err());
        assert_eq!(overrides.get_now(&id), Some(OverrideSlot::Absent));
        assert_eq!(storage.get("override:r").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_clear_all_unprimes_indexed_keys() {
        let (storage, _, overrides) = rejecting_store();
        let id = EntityId::from("c");
        overrides.set(&id, None).await.unwrap();

        storage.reject(Some(OVERRIDE_INDEX_KEY));
        assert!(overrides.clear_all().await.is_err());
        assert_eq!(overrides.get_now(&id), None);
        assert_eq!(
            overrides.get(&id).await.unwrap(),
            Some(OverrideRecord::Cleared)
        );
    }
}
