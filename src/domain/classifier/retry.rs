use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::future::retry_notify;
use tracing::{error, warn};

use crate::utils::{AppError, FatalReason};

/// Attempts per classification, first try included
pub const MAX_ATTEMPTS: u32 = 3;
/// Pause between consecutive attempts
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

/// What to do with a non-2xx classifier status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    Abort(FatalReason),
}

/// Statuses that end the run immediately; every other non-2xx is retried
const FATAL_STATUSES: &[(u16, FatalReason)] = &[
    (401, FatalReason::Unauthorized),
    (400, FatalReason::BadRequest),
];

pub fn decide_status(status: u16) -> RetryDecision {
    FATAL_STATUSES
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, reason)| RetryDecision::Abort(*reason))
        .unwrap_or(RetryDecision::Retry)
}

/// Fixed delay, capped number of attempts
#[derive(Debug, Clone)]
pub struct FixedAttempts {
    delay: Duration,
    max_attempts: u32,
    retries_used: u32,
}

impl FixedAttempts {
    pub fn new(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts,
            retries_used: 0,
        }
    }
}

impl Backoff for FixedAttempts {
    fn reset(&mut self) {
        self.retries_used = 0;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        // called after a failed attempt; attempts made so far = retries_used + 1
        if self.retries_used + 1 >= self.max_attempts {
            return None;
        }
        self.retries_used += 1;
        Some(self.delay)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            delay: RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    fn backoff(&self) -> FixedAttempts {
        FixedAttempts::new(self.delay, self.max_attempts)
    }
}

/// Run `operation` under `policy`.
///
/// `operation` receives the 1-based attempt number. Retryable errors sleep and
/// try again; anything else is returned at once. When attempts run out the last
/// retryable error is folded into `AppError::ClassifyExhausted`.
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, mut operation: F) -> Result<T, AppError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 0u32;

    let result = retry_notify(
        policy.backoff(),
        || {
            attempt += 1;
            let fut = operation(attempt);
            async move {
                fut.await.map_err(|e| {
                    if e.is_retryable() {
                        backoff::Error::transient(e)
                    } else {
                        backoff::Error::permanent(e)
                    }
                })
            }
        },
        |e: AppError, wait: Duration| {
            warn!(error = %e, retry_in_ms = wait.as_millis() as u64, "Retryable error, will retry...");
        },
    )
    .await;

    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_retryable() => {
            error!(attempts = attempt, error = %e, "Retries exhausted");
            Err(AppError::ClassifyExhausted {
                attempts: attempt,
                last_error: e.to_string(),
            })
        }
        Err(e) => {
            error!(error = %e, code = e.error_code(), "Permanent error, not retrying");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    #[test]
    fn decide_status_should_abort_on_401() {
        assert_eq!(
            decide_status(401),
            RetryDecision::Abort(FatalReason::Unauthorized)
        );
    }

    #[test]
    fn decide_status_should_abort_on_400() {
        assert_eq!(
            decide_status(400),
            RetryDecision::Abort(FatalReason::BadRequest)
        );
    }

    #[test]
    fn decide_status_should_retry_everything_else() {
        for status in [403, 404, 408, 429, 500, 502, 503, 504] {
            assert_eq!(decide_status(status), RetryDecision::Retry, "status {}", status);
        }
    }

    #[test]
    fn fixed_attempts_should_allow_two_waits_for_three_attempts() {
        // Arrange
        let mut backoff = FixedAttempts::new(RETRY_DELAY, 3);

        // Act & Assert
        assert_eq!(backoff.next_backoff(), Some(RETRY_DELAY));
        assert_eq!(backoff.next_backoff(), Some(RETRY_DELAY));
        assert_eq!(backoff.next_backoff(), None);

        backoff.reset();
        assert_eq!(backoff.next_backoff(), Some(RETRY_DELAY));
    }

    #[test]
    fn default_policy_should_be_three_attempts_two_seconds_apart() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn with_retry_should_succeed_on_first_try() {
        let result = with_retry(&RetryPolicy::default(), |_| async { Ok::<_, AppError>("ok") }).await;

        assert_eq!(result.unwrap(), "ok");
    }

    #[tokio::test(start_paused = true)]
    async fn with_retry_should_recover_after_transient_error() {
        // Arrange
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);

        // Act
        let result = with_retry(&RetryPolicy::default(), |_| {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(AppError::transient("connection reset"))
                } else {
                    Ok("narrative")
                }
            }
        })
        .await;

        // Assert
        assert_eq!(result.unwrap(), "narrative");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn with_retry_should_stop_after_three_attempts_spaced_two_seconds() {
        // Arrange
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let started = Instant::now();

        // Act
        let result = with_retry(&RetryPolicy::default(), |attempt| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push((attempt, started.elapsed()));
                Err::<(), _>(AppError::transient("HTTP 503"))
            }
        })
        .await;

        // Assert
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], (1, Duration::ZERO));
        assert_eq!(seen[1].0, 2);
        assert!(seen[1].1 >= Duration::from_secs(2));
        assert_eq!(seen[2].0, 3);
        assert!(seen[2].1 >= Duration::from_secs(4));
        assert!(started.elapsed() < Duration::from_secs(5));
        match result {
            Err(AppError::ClassifyExhausted { attempts, last_error }) => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("HTTP 503"));
            }
            other => panic!("Expected ClassifyExhausted, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn with_retry_should_not_retry_fatal_error() {
        // Arrange
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);
        let started = Instant::now();

        // Act
        let result = with_retry(&RetryPolicy::default(), |_| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(AppError::ClassifyFatal(FatalReason::Unauthorized))
            }
        })
        .await;

        // Assert
        assert!(matches!(
            result,
            Err(AppError::ClassifyFatal(FatalReason::Unauthorized))
        ));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
