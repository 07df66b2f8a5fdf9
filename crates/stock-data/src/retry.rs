//! Bounded retry with a fixed pause
//!
//! Only transient failures (no response, provider 5xx) are retried; every other error
//! is returned from the first attempt.

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::StockConfig;
use crate::error::Result;

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, the first one included
    pub max_attempts: u32,

    /// Pause between consecutive attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn from_config(config: &StockConfig) -> Self {
        Self::new(config.max_attempts, config.retry_backoff)
    }

    /// Create a policy with no retries
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Execute an async operation with retry logic
    ///
    /// # Arguments
    ///
    /// * `operation_name` - Name of the operation (for logging)
    /// * `operation` - Async operation to execute
    ///
    /// # Returns
    ///
    /// Result of the operation, or the last error if all attempts fail
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 1;

        loop {
            debug!(
                "Attempt {}/{} for operation: {}",
                attempt, self.max_attempts, operation_name
            );

            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!(
                            "Operation '{}' succeeded after {} retries",
                            operation_name,
                            attempt - 1
                        );
                    }
                    return Ok(result);
                }
                Err(e) if !e.is_retryable() => {
                    debug!("Operation '{}' failed with non-retryable error: {}", operation_name, e);
                    return Err(e);
                }
                Err(e) if attempt >= self.max_attempts => {
                    warn!(
                        "Operation '{}' failed after {} attempts: {}",
                        operation_name, self.max_attempts, e
                    );
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        "Operation '{}' failed (attempt {}/{}): {}. Retrying in {:?}",
                        operation_name, attempt, self.max_attempts, e, self.backoff
                    );
                    sleep(self.backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}
