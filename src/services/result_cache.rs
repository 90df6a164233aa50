//! Session-lifetime cache of remotely resolved pronouns.
//!
//! Entries are written by the batch dispatcher (including "no value"
//! results for failed batches) and are never evicted or expired. The only
//! removals are override-driven invalidation and explicit `forget`.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::domain::models::{EntityId, PronounCode};

#[derive(Debug, Default)]
pub struct ResultCache {
    entries: RwLock<HashMap<EntityId, Option<PronounCode>>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when `id` was never resolved; `Some(None)` when it resolved to
    /// no value.
    pub fn get(&self, id: &EntityId) -> Option<Option<PronounCode>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .copied()
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn insert(&self, id: EntityId, value: Option<PronounCode>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, value);
    }

    pub fn extend(&self, values: impl IntoIterator<Item = (EntityId, Option<PronounCode>)>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(values);
    }

    /// Drop the entry for `id`, returning whether one existed.
    pub fn invalidate(&self, id: &EntityId) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
