//! Sends one coalesced batch to the remote source and fans the answer out.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::domain::models::{EntityId, PronounCode};
use crate::domain::ports::PronounSource;

use super::result_cache::ResultCache;

/// Single-use handle that receives the resolved value for one request.
pub type Waiter = oneshot::Sender<Option<PronounCode>>;

/// Waiters of one dispatch window, keyed by entity.
pub type Batch = HashMap<EntityId, Vec<Waiter>>;

/// Invokes the remote source for a batch and delivers the outcome.
///
/// Dispatch is infallible: a failed lookup resolves every key of the batch to
/// "no value", caches that result and reports the failure through `tracing`.
pub struct BatchDispatcher<S: PronounSource> {
    source: Arc<S>,
    results: Arc<ResultCache>,
}

impl<S: PronounSource> BatchDispatcher<S> {
    pub fn new(source: Arc<S>, results: Arc<ResultCache>) -> Self {
        Self { source, results }
    }

    pub async fn dispatch(&self, batch: Batch) {
        if batch.is_empty() {
            return;
        }

        let mut ids: Vec<EntityId> = batch.keys().cloned().collect();
        ids.sort_unstable();
        debug!(batch_size = ids.len(), "dispatching pronoun lookup batch");

        let resolved: HashMap<EntityId, Option<PronounCode>> = match self.source.lookup(&ids).await {
            Ok(mut found) => {
                let mut resolved: HashMap<_, _> = ids
                    .iter()
                    .map(|id| (id.clone(), found.remove(id)))
                    .collect();
                // Answers for ids outside the batch are still worth keeping.
                resolved.extend(found.into_iter().map(|(id, code)| (id, Some(code))));
                resolved
            }
            Err(err) => {
                warn!(
                    error = %err,
                    batch_size = ids.len(),
                    "pronoun lookup failed, caching batch as unresolved"
                );
                ids.iter().map(|id| (id.clone(), None)).collect()
            }
        };

        self.results
            .extend(resolved.iter().map(|(id, value)| (id.clone(), *value)));

        for (id, waiters) in batch {
            let value = resolved.get(&id).copied().flatten();
            for waiter in waiters {
                // The caller may have gone away; nothing else is owed to it.
                let _ = waiter.send(value);
            }
        }
    }
}
