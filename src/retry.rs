use std::future::Future;
use std::time::Duration;

use crate::config::QueryConfig;
use crate::error::DataError;

/// Explicit retry policy for read operations.
///
/// Transient faults get up to `max_attempts` tries with linear backoff.
/// Permission denials never retry — row-level security will answer the
/// same way every time — and neither do configuration, validation or
/// precondition errors.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &QueryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, DataError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DataError>>,
    {
        let mut attempt = 1u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    tracing::warn!(attempt, error = %e, "transient backend fault, retrying");
                    tokio::time::sleep(self.backoff.saturating_mul(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
