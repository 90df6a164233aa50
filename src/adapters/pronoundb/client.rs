//! PronounDB HTTP client with retry.
//!
//! One `lookup` call maps to one bulk request
//! (`GET /api/v2/lookup?platform=..&ids=a,b,c`). Transport errors, 429 and
//! 5xx responses are retried with exponential backoff up to `max_retries`;
//! other failures are returned immediately.

use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoffBuilder;
use reqwest::Client;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::errors::{DomainError, DomainResult, LookupError};
use crate::domain::models::{EntityId, LookupConfig};
use crate::domain::ports::{LookupResult, PronounSource};

use super::models::LookupResponse;

/// Header PronounDB uses to attribute traffic to an integration.
const SOURCE_HEADER: &str = "X-PronounDB-Source";

const SOURCE_NAME: &str = concat!("pronoun-cache/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the PronounDB v2 API.
#[derive(Debug, Clone)]
pub struct PronounDbClient {
    http: Client,
    base_url: String,
    platform: String,
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl PronounDbClient {
    pub fn new(config: &LookupConfig) -> DomainResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            platform: config.platform.clone(),
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        })
    }

    async fn fetch_once(&self, ids: &[EntityId]) -> Result<LookupResult, LookupError> {
        let url = format!("{}/api/v2/lookup", self.base_url);
        let joined = ids.iter().map(EntityId::as_str).collect::<Vec<_>>().join(",");

        let resp = self
            .http
            .get(&url)
            .query(&[("platform", self.platform.as_str()), ("ids", joined.as_str())])
            .header(SOURCE_HEADER, SOURCE_NAME)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LookupError::Timeout
                } else {
                    LookupError::RequestFailed(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LookupError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body: LookupResponse = resp
            .json()
            .await
            .map_err(|e| LookupError::MalformedResponse(e.to_string()))?;

        Ok(body
            .into_iter()
            .filter_map(|(id, entry)| entry.pronouns().map(|code| (EntityId::from(id), code)))
            .collect())
    }
}

#[async_trait]
impl PronounSource for PronounDbClient {
    async fn lookup(&self, ids: &[EntityId]) -> Result<LookupResult, LookupError> {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_backoff)
            .with_max_interval(self.max_backoff)
            .with_max_elapsed_time(None)
            .build();

        let attempts = AtomicU32::new(0);
        let attempts = &attempts;
        let result = retry(policy, || async move {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed);
            self.fetch_once(ids).await.map_err(|err| {
                if err.is_transient() && attempt < self.max_retries {
                    warn!(attempt, error = %err, "pronoun lookup failed, retrying");
                    backoff::Error::transient(err)
                } else {
                    backoff::Error::permanent(err)
                }
            })
        })
        .await;

        if let Ok(found) = &result {
            debug!(requested = ids.len(), found = found.len(), "pronoun lookup completed");
        }
        result
    }
}
