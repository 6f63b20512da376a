use std::time::Duration;
use std::future::Future;

use super::classification::ErrorClassification;
use super::types::OracleError;
use tracing::warn;

impl ErrorClassification {
    /// Delay before the next attempt. Rate limits use the configured fixed
    /// backoff; nothing else is retried, so every other class waits zero.
    pub fn retry_delay(&self, config: &RetryConfig) -> Duration {
        match self.error_type {
            "RateLimitError" => config.rate_limit_backoff,
            _ => Duration::ZERO,
        }
    }
}

/// Retry configuration for oracle calls.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub rate_limit_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            rate_limit_backoff: Duration::from_secs(30),
        }
    }
}

/// Execute an async operation with retry logic.
///
/// Retries only if the error is classified as retryable and we haven't
/// exceeded max_retries.
pub async fn with_retry<F, Fut, T>(
    operation_name: &str,
    config: &RetryConfig,
    mut factory: F,
) -> Result<T, OracleError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, OracleError>>,
{
    let max_attempts = config.max_retries + 1;
    let mut attempt = 0;

    loop {
        let err = match factory().await {
            Ok(result) => return Ok(result),
            Err(e) => e,
        };

        let classification = err.classify();
        attempt += 1;

        if !classification.retryable {
            warn!(
                operation = operation_name,
                error_type = classification.error_type,
                "Non-retryable error, failing immediately"
            );
            return Err(err);
        }
        if attempt >= max_attempts {
            warn!(
                operation = operation_name,
                attempt,
                max = max_attempts,
                "Max retries exhausted"
            );
            return Err(err);
        }

        let delay = classification.retry_delay(config);
        warn!(
            operation = operation_name,
            attempt,
            max = max_attempts,
            error_type = classification.error_type,
            delay_secs = delay.as_secs(),
            error = %err,
            "Retrying after error"
        );
        tokio::time::sleep(delay).await;
    }
}
