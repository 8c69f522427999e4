//! Error types for the sync engine.

use thiserror::Error;

/// Errors produced while talking to Snipe-IT, the directory service, or the
/// classifier.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Transport-level failure (connection refused, DNS, timeout, ...).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote returned HTTP 429.
    #[error("rate limited by remote (retry-after: {retry_after_secs:?})")]
    RateLimited { retry_after_secs: Option<u64> },

    /// The retry budget was exhausted without ever getting a usable response.
    ///
    /// This is the explicit "no response" outcome: callers must treat it as a
    /// failure distinct from a valid error response from the remote.
    #[error("max retries exceeded after {attempts} attempt(s): {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// The remote answered but the body could not be parsed as JSON.
    #[error("failed to parse response body: {0}")]
    Parse(String),

    /// Unclassified remote error (unexpected status or structured error payload).
    #[error("remote API error (status {status}): {detail}")]
    Api { status: u16, detail: String },

    /// The AI classifier call failed or returned an unusable response.
    #[error("classifier error: {0}")]
    Classifier(String),

    /// A device record is unusable (e.g. no serial number to key on).
    #[error("invalid device record: {0}")]
    InvalidRecord(String),

    /// Invalid client or engine configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// Whether the retry policy should retry this error.
    ///
    /// Only rate limiting and connection-level failures are retryable; a
    /// structured error response from the remote is a final answer.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::RateLimited { .. } => true,
            SyncError::Http(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
