//! Remote pronoun source port.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::errors::LookupError;
use crate::domain::models::{EntityId, PronounCode};

/// Successful lookup payload. Ids without an answer are simply absent.
pub type LookupResult = HashMap<EntityId, PronounCode>;

/// Batch lookup against a remote pronoun service.
///
/// Called at most once per dispatch window with the distinct ids of the
/// batch. Implementations own their timeout and retry policy.
#[async_trait]
pub trait PronounSource: Send + Sync {
    async fn lookup(&self, ids: &[EntityId]) -> Result<LookupResult, LookupError>;
}
