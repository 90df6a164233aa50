//! Domain errors for the pronoun resolution cache.

use thiserror::Error;

/// Domain-level errors surfaced by override administration and persistence.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unknown pronoun code: {0}")]
    UnknownPronounCode(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

/// Failures reported by a remote pronoun source.
///
/// These never reach `Resolver::resolve` callers; the batch dispatcher
/// converts them into "no value" results and logs them.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Lookup returned {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Malformed lookup response: {0}")]
    MalformedResponse(String),

    #[error("Lookup timed out")]
    Timeout,
}

impl LookupError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(_) | Self::Timeout => true,
            Self::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
            Self::MalformedResponse(_) => false,
        }
    }
}
