//! Exponential backoff for transient remote failures

use std::fmt::Display;
use std::time::Duration;

use tracing::warn;

/// Substrings (lowercase) marking an error as rate-limit or transient-server
pub const RETRYABLE_INDICATORS: &[&str] = &[
    "429",
    "rate limit",
    "resource exhausted",
    "quota",
    "500",
    "502",
    "503",
    "504",
    "unavailable",
    "overloaded",
    "timeout",
    "timed out",
    "connection reset",
];

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
const DEFAULT_MAX_DELAY_MS: u64 = 30_000;

pub fn is_retryable_message(message: &str) -> bool {
    let lowered = message.to_lowercase();
    RETRYABLE_INDICATORS.iter().any(|i| lowered.contains(i))
}

/// Errors that know whether another attempt may succeed. The default asks
/// the indicator matcher about the rendered message.
pub trait Transient: Display {
    fn is_transient(&self, indicators: fn(&str) -> bool) -> bool {
        indicators(&self.to_string())
    }
}

impl Transient for String {}

/// Pauses between attempts. Tests swap in a recorder.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total tries including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Indicator matcher for free-form error messages
    pub retryable: fn(&str) -> bool,
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
            retryable: is_retryable_message,
        }
    }

    /// Wait after failed attempt `attempt` (1-based): base * 2^(attempt-1), capped
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempts run out. The last error is returned unchanged.
    pub fn run<T, E, F>(&self, sleeper: &dyn Sleeper, mut op: F) -> Result<T, E>
    where
        E: Transient,
        F: FnMut(u32) -> Result<T, E>,
    {
        let mut attempt = 1;
        loop {
            let err = match op(attempt) {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if attempt >= self.max_attempts || !err.is_transient(self.retryable) {
                return Err(err);
            }

            let delay = self.delay_for(attempt);
            warn!(
                attempt,
                max_attempts = self.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "retryable remote failure, backing off"
            );
            sleeper.sleep(delay);
            attempt += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Duration>>);

    impl Sleeper for Recorder {
        fn sleep(&self, duration: Duration) {
            self.0.lock().unwrap().push(duration);
        }
    }

    #[test]
    fn test_indicators() {
        assert!(is_retryable_message("status 429: Too Many Requests"));
        assert!(is_retryable_message("RESOURCE EXHAUSTED"));
        assert!(is_retryable_message("request timed out"));
        assert!(is_retryable_message("Service Unavailable"));
        assert!(!is_retryable_message("status 400: invalid argument"));
        assert!(!is_retryable_message("API key not valid"));
    }

    #[test]
    fn test_delay_schedule() {
        let policy = RetryPolicy::new();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for(6), Duration::from_secs(30));
        assert_eq!(policy.delay_for(40), Duration::from_secs(30));
    }

    #[test]
    fn test_retryable_then_success() {
        let sleeper = Recorder::default();
        let mut calls = 0;
        let result: Result<&str, String> = RetryPolicy::new().run(&sleeper, |_| {
            calls += 1;
            if calls < 3 {
                Err("503 overloaded".to_string())
            } else {
                Ok("done")
            }
        });
        assert_eq!(result, Ok("done"));
        assert_eq!(calls, 3);
        assert_eq!(
            *sleeper.0.lock().unwrap(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[test]
    fn test_non_retryable_aborts_immediately() {
        let sleeper = Recorder::default();
        let mut calls = 0;
        let result: Result<(), String> = RetryPolicy::new().run(&sleeper, |_| {
            calls += 1;
            Err("400 bad request".to_string())
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
        assert!(sleeper.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_exhaustion_returns_last_error() {
        let sleeper = Recorder::default();
        let result: Result<(), String> =
            RetryPolicy::new().run(&sleeper, |attempt| Err(format!("429 attempt {}", attempt)));
        assert_eq!(result, Err("429 attempt 3".to_string()));
        assert_eq!(sleeper.0.lock().unwrap().len(), 2);
    }
}
