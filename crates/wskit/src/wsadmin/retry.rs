//! Retry logic with exponential backoff for transient wsadmin errors.

use crate::error::{Error, Result};
use std::thread;
use std::time::Duration;

/// How often and how patiently to retry retryable failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Base delay between retries
    pub base_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_factor: f64,
    /// Maximum delay between retries
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    /// A single attempt. Reconciliation itself never retries; retries are
    /// opted into per executor.
    fn default() -> Self {
        Self::no_retry()
    }
}

impl RetryConfig {
    /// Create a new retry config with custom settings.
    pub fn new(max_attempts: u32, base_delay: Duration, backoff_factor: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            backoff_factor,
            max_delay: Duration::from_secs(120),
        }
    }

    /// Calculate the delay for a given attempt number (0-indexed).
    ///
    /// Never exceeds `max_delay`; a nonsensical factor yields zero or
    /// `max_delay` rather than panicking.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let delay = self.base_delay.as_secs_f64() * self.backoff_factor.powi(exponent);
        let capped = delay.min(self.max_delay.as_secs_f64()).max(0.0);
        Duration::try_from_secs_f64(capped).unwrap_or(self.max_delay)
    }

    /// Create a config that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::from_secs(5),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(120),
        }
    }
}

/// Callback trait for retry progress notifications.
pub trait RetryCallback: Send + Sync {
    /// Called when an operation is being retried.
    ///
    /// `attempt` is 1-indexed; `delay` is the wait before the next attempt.
    fn on_retry(&self, attempt: u32, max_attempts: u32, error: &Error, delay: Duration);
}

/// No-op callback that does nothing.
pub struct NoCallback;

impl RetryCallback for NoCallback {
    fn on_retry(&self, _attempt: u32, _max_attempts: u32, _error: &Error, _delay: Duration) {}
}

/// Callback that reports retries through the `log` facade.
pub struct LogCallback;

impl RetryCallback for LogCallback {
    fn on_retry(&self, attempt: u32, max_attempts: u32, error: &Error, delay: Duration) {
        log::warn!(
            "Attempt {attempt}/{max_attempts} failed: {error}. Retrying in {}s...",
            delay.as_secs()
        );
    }
}

/// Execute an operation with retry logic.
///
/// Retries the operation if it returns a retryable error, using exponential
/// backoff between attempts. Non-retryable errors are returned at once.
pub fn with_retry<T, F>(
    config: &RetryConfig,
    callback: Option<&dyn RetryCallback>,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut attempt = 0;
    loop {
        match operation() {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !e.is_retryable() || attempt + 1 >= config.max_attempts {
                    return Err(e);
                }

                let delay = config.delay_for_attempt(attempt);
                if let Some(cb) = callback {
                    cb.on_retry(attempt + 1, config.max_attempts, &e, delay);
                }
                thread::sleep(delay);
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            base_delay: Duration::from_millis(1),
            backoff_factor: 1.0,
            max_delay: Duration::from_millis(10),
        }
    }

    fn connection_refused() -> Error {
        Error::Connection {
            message: "Connection refused".to_string(),
        }
    }

    #[test]
    fn test_default_does_not_retry() {
        let attempts = Cell::new(0);
        let result: Result<()> = with_retry(&RetryConfig::default(), None, || {
            attempts.set(attempts.get() + 1);
            Err(connection_refused())
        });

        assert!(result.is_err());
        assert_eq!(attempts.get(), 1);
    }

    #[test]
    fn test_non_retryable_error() {
        let attempts = Cell::new(0);
        let result: Result<()> = with_retry(&fast(5), None, || {
            attempts.set(attempts.get() + 1);
            Err(Error::Authentication {
                message: "ADMN0022E".to_string(),
            })
        });

        assert!(result.is_err());
        assert_eq!(attempts.get(), 1);
    }

    #[test]
    fn test_eventual_success() {
        let attempts = Cell::new(0);
        let result = with_retry(&fast(3), None, || {
            let current = attempts.get();
            attempts.set(current + 1);
            if current < 2 {
                Err(connection_refused())
            } else {
                Ok(42)
            }
        });

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.get(), 3);
    }

    #[test]
    fn test_callback_invoked_between_attempts() {
        struct Counting(AtomicU32);
        impl RetryCallback for Counting {
            fn on_retry(&self, _: u32, _: u32, _: &Error, _: Duration) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let callback = Counting(AtomicU32::new(0));
        let _: Result<()> = with_retry(&fast(3), Some(&callback), || Err(connection_refused()));

        assert_eq!(callback.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_delay_backoff_is_capped() {
        let config = RetryConfig {
            max_delay: Duration::from_secs(30),
            ..RetryConfig::new(5, Duration::from_secs(10), 2.0)
        };

        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(10));
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(20));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(30));
    }

    #[test]
    fn test_delay_never_panics_on_bad_settings() {
        let negative = RetryConfig::new(3, Duration::from_secs(5), -2.0);
        assert_eq!(negative.delay_for_attempt(1), Duration::ZERO);
        assert_eq!(negative.delay_for_attempt(2), Duration::from_secs(20));

        let nan = RetryConfig::new(3, Duration::from_secs(5), f64::NAN);
        assert_eq!(nan.delay_for_attempt(1), nan.max_delay);

        let huge = RetryConfig {
            max_delay: Duration::from_secs(u64::MAX),
            ..RetryConfig::new(3, Duration::from_secs(u64::MAX), 10.0)
        };
        assert_eq!(huge.delay_for_attempt(4), huge.max_delay);
    }
}
