//! Mock pronoun source for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::errors::LookupError;
use crate::domain::models::{EntityId, PronounCode};
use crate::domain::ports::{LookupResult, PronounSource};

/// Mock source answering from a fixed table and recording every batch.
#[derive(Debug, Default)]
pub struct MockPronounSource {
    responses: Arc<RwLock<HashMap<EntityId, PronounCode>>>,
    calls: Arc<RwLock<Vec<Vec<EntityId>>>>,
    failing: AtomicBool,
    latency: Option<Duration>,
}

impl MockPronounSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every lookup by `latency` before answering.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    pub async fn respond(&self, id: impl Into<EntityId>, code: PronounCode) {
        self.responses.write().await.insert(id.into(), code);
    }

    /// Make subsequent lookups fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every batch received so far, in call order.
    pub async fn calls(&self) -> Vec<Vec<EntityId>> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl PronounSource for MockPronounSource {
    async fn lookup(&self, ids: &[EntityId]) -> Result<LookupResult, LookupError> {
        self.calls.write().await.push(ids.to_vec());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(LookupError::RequestFailed("mock source unavailable".to_string()));
        }

        let responses = self.responses.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| responses.get(id).map(|code| (id.clone(), *code)))
            .collect())
    }
}
