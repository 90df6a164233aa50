//! Public entry point for pronoun resolution.
//!
//! `Resolver` owns every piece of session state (override mirror, result
//! cache, pending queue), so independent instances never share anything.
//! Resolution is override-first, then cache, then a coalesced remote batch.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::{EntityId, LookupConfig, OverrideRecord, OverrideSlot, PronounCode};
use crate::domain::ports::{KeyValueStore, PronounSource};

use super::batch_dispatcher::BatchDispatcher;
use super::override_store::OverrideStore;
use super::request_coalescer::RequestCoalescer;
use super::result_cache::ResultCache;

pub struct Resolver<S: PronounSource, K: KeyValueStore> {
    overrides: OverrideStore<K>,
    results: Arc<ResultCache>,
    coalescer: Arc<RequestCoalescer<S>>,
}

impl<S, K> Resolver<S, K>
where
    S: PronounSource + 'static,
    K: KeyValueStore,
{
    pub fn new(source: Arc<S>, storage: Arc<K>, quiescence: Duration) -> Self {
        let results = Arc::new(ResultCache::new());
        let dispatcher = BatchDispatcher::new(source, results.clone());
        Self {
            overrides: OverrideStore::new(storage, results.clone()),
            coalescer: RequestCoalescer::new(dispatcher, quiescence),
            results,
        }
    }

    pub fn from_config(source: Arc<S>, storage: Arc<K>, config: &LookupConfig) -> Self {
        Self::new(source, storage, Duration::from_millis(config.quiescence_ms))
    }

    /// Resolve the pronouns of `id`.
    ///
    /// Never fails: an unreachable source, a missing answer or an unreadable
    /// override all surface as `None`, with details in the logs.
    #[instrument(skip_all, fields(entity_id = %id))]
    pub async fn resolve(&self, id: &EntityId) -> Option<PronounCode> {
        match self.overrides.get(id).await {
            Ok(Some(record)) => {
                debug!(?record, "resolved from override");
                return record.value();
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "override lookup failed, resolving remotely"),
        }

        if let Some(cached) = self.results.get(id) {
            debug!(pronouns = ?cached, "resolved from cache");
            return cached;
        }

        self.coalescer.enqueue(id.clone()).await.unwrap_or_else(|_| {
            warn!("pending request dropped before its batch completed");
            None
        })
    }

    /// Currently known value for `id`, without triggering any resolution.
    pub fn peek(&self, id: &EntityId) -> Option<PronounCode> {
        match self.overrides.get_now(id) {
            Some(OverrideSlot::Present(record)) => record.value(),
            _ => self.results.get(id).flatten(),
        }
    }

    pub async fn get_override(&self, id: &EntityId) -> DomainResult<Option<OverrideRecord>> {
        self.overrides.get(id).await
    }

    /// Persist an override; `None` records an explicit "no preference".
    pub async fn set_override(&self, id: &EntityId, value: Option<PronounCode>) -> DomainResult<()> {
        self.overrides.set(id, value).await
    }

    pub async fn remove_override(&self, id: &EntityId) -> DomainResult<bool> {
        self.overrides.remove(id).await
    }

    pub async fn clear_all_overrides(&self) -> DomainResult<usize> {
        self.overrides.clear_all().await
    }

    pub async fn list_overrides(&self) -> DomainResult<Vec<EntityId>> {
        self.overrides.list().await
    }

    /// Drop the cached remote result for `id` so the next `resolve` asks the
    /// source again. Failed lookups otherwise stay cached for the session.
    pub fn forget(&self, id: &EntityId) -> bool {
        self.results.invalidate(id)
    }

    /// Number of cached remote results.
    pub fn cached_len(&self) -> usize {
        self.results.len()
    }
}
