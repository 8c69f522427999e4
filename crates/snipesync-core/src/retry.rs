//! Fixed-delay retry policy for requests against rate-limited endpoints.
//!
//! There is exactly one retry authority in the engine: every request goes
//! through a [`RetryPolicy`] at the transport boundary, so rate-limit
//! handling is never stacked across layers.

use crate::error::{SyncError, SyncResult};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Retry policy configuration.
///
/// Uses a fixed delay between attempts.  This is adequate for the low request
/// volumes of a fleet sync; the policy type is the place to grow a smarter
/// backoff strategy if throughput ever demands it.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts (1 = no retries).
    pub max_attempts: u32,
    /// Delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            delay: Duration::from_secs(20),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt budget and delay in seconds.
    #[must_use]
    pub fn new(max_attempts: u32, delay_secs: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay: Duration::from_secs(delay_secs),
        }
    }

    /// Execute an async operation, retrying on rate limiting and
    /// connection-level failures.
    ///
    /// Non-retryable errors are returned immediately.  After the attempt
    /// budget is spent the final error is replaced by
    /// [`SyncError::RetriesExhausted`] so callers can distinguish "never got
    /// a usable response" from a valid error response.
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut f: F) -> SyncResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = SyncResult<T>>,
    {
        let mut attempt: u32 = 1;
        loop {
            match f().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(
                            operation = operation_name,
                            attempt, "operation succeeded after retries"
                        );
                    }
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    warn!(
                        operation = operation_name,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_secs = self.delay.as_secs(),
                        error = %e,
                        "retrying after transient error"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(e) if e.is_retryable() => {
                    error!(
                        operation = operation_name,
                        attempts = attempt,
                        error = %e,
                        "max retries exceeded"
                    );
                    return Err(SyncError::RetriesExhausted {
                        attempts: attempt,
                        message: format!("{operation_name}: {e}"),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }
}
