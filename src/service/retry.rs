//! Retry executor for transient failures.

use std::time::Duration;

use tracing::{debug, error, warn};

use crate::error::{retry::ErrorRetryStrategy, Error};

/// Executes operations with automatic retry for transient errors.
///
/// Each error is classified through [`Error::to_retry_strategy`]: transient
/// errors back off exponentially up to the attempt budget, permanent errors
/// fail immediately.
pub struct RetryContext {
    /// Max attempts before failure.
    max_attempts: u32,
    /// Initial backoff between attempts.
    initial_backoff_secs: u64,
}

impl RetryContext {
    const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    const DEFAULT_INITIAL_BACKOFF_SECS: u64 = 1;

    pub fn new() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            initial_backoff_secs: Self::DEFAULT_INITIAL_BACKOFF_SECS,
        }
    }

    /// Execute an operation with automatic retry logic.
    ///
    /// # Arguments
    /// - `description`: Description of the operation for logging (e.g., "affiliation batch 3")
    /// - `operation`: Async closure performing the fallible work; re-invoked on transient failure
    pub async fn execute_with_retry<R, F, Fut>(
        &self,
        description: &str,
        operation: F,
    ) -> Result<R, Error>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<R, Error>>,
    {
        let mut attempt_count = 0;

        loop {
            debug!(
                "Processing {} (attempt {}/{})",
                description,
                attempt_count + 1,
                self.max_attempts
            );

            match operation().await {
                Ok(result) => {
                    debug!("Successfully processed {}", description);
                    return Ok(result);
                }
                Err(e) => match e.to_retry_strategy() {
                    ErrorRetryStrategy::Fail => {
                        error!("Permanent error for {}: {:?}", description, e);
                        return Err(e);
                    }
                    ErrorRetryStrategy::Retry => {
                        attempt_count += 1;
                        if attempt_count >= self.max_attempts {
                            error!(
                                "Max attempts ({}) exceeded for {}: {:?}",
                                self.max_attempts, description, e
                            );
                            return Err(e);
                        }

                        let backoff_secs =
                            self.initial_backoff_secs * 2_u64.pow(attempt_count - 1);
                        let backoff = Duration::from_secs(backoff_secs);

                        warn!(
                            "Retrying {} (attempt {}/{}) after {:?}: {:?}",
                            description, attempt_count, self.max_attempts, backoff, e
                        );

                        tokio::time::sleep(backoff).await;
                    }
                },
            }
        }
    }
}

impl Default for RetryContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::error::domain::DomainError;
    use crate::error::esi::EsiError;

    /// Expect permanent errors to fail without a second attempt
    #[tokio::test]
    async fn fails_immediately_on_permanent_errors() {
        let attempts = &AtomicU32::new(0);

        let result: Result<(), Error> = RetryContext::new()
            .execute_with_retry("validation", move || async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(DomainError::Validation("bad input".to_string()).into())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    /// Expect transient errors to be retried until success
    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors() {
        let attempts = &AtomicU32::new(0);

        let result = RetryContext::new()
            .execute_with_retry("flaky upstream", move || async move {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                if attempt < 2 {
                    Err(Error::EsiError(EsiError::Status {
                        status: 502,
                        path: "/characters/1/".to_string(),
                        body: String::new(),
                    }))
                } else {
                    Ok(attempt)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    /// Expect rate limits to be retried like any other transient error
    #[tokio::test(start_paused = true)]
    async fn retries_rate_limited_responses() {
        let attempts = &AtomicU32::new(0);

        let result = RetryContext::new()
            .execute_with_retry("rate limited upstream", move || async move {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                if attempt == 0 {
                    Err(Error::EsiError(EsiError::Status {
                        status: 429,
                        path: "/characters/affiliation/".to_string(),
                        body: String::new(),
                    }))
                } else {
                    Ok(attempt)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    /// Expect the attempt budget to bound transient retries
    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let attempts = &AtomicU32::new(0);

        let result: Result<(), Error> = RetryContext::new()
            .execute_with_retry("dead upstream", move || async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(Error::EsiError(EsiError::Status {
                    status: 503,
                    path: "/characters/1/".to_string(),
                    body: String::new(),
                }))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
