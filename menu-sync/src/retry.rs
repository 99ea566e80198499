//! Retry policy
//!
//! One policy abstraction shared by every retried operation (snapshot
//! fetch, resubscribe) instead of ad-hoc loops with manual counters.
//! Exponential backoff with optional jitter, always bounded by
//! `max_attempts` — never an unbounded loop.

use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Must be at least 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Relative jitter in `0.0..=1.0`; 0.2 means ±20% of the delay.
    pub jitter: f64,
}

impl RetryPolicy {
    /// Policy for resubscribing a dropped change feed channel.
    pub fn resubscribe_default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter: 0.3,
        }
    }

    /// Backoff before the next attempt, given how many attempts failed so
    /// far (1-based). Doubles per attempt, capped at `max_delay`.
    pub fn delay_for(&self, failed_attempts: u32) -> Duration {
        let exp = failed_attempts.saturating_sub(1).min(16);
        let raw = self.base_delay.as_millis() as f64 * 2f64.powi(exp as i32);
        let capped = raw.min(self.max_delay.as_millis() as f64);
        let factor = if self.jitter > 0.0 {
            1.0 + self.jitter * (rand::random::<f64>() * 2.0 - 1.0)
        } else {
            1.0
        };
        Duration::from_millis((capped * factor).max(0.0) as u64)
    }

    /// Run `op` until it succeeds or the attempt budget is exhausted.
    /// Returns the last error when every attempt failed.
    pub async fn run<T, E, F, Fut>(&self, op_name: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= self.max_attempts.max(1) => {
                    tracing::error!(%err, attempt, "{op_name} failed, attempts exhausted");
                    return Err(err);
                }
                Err(err) => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(%err, attempt, ?delay, "{op_name} failed, retrying");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn no_jitter(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(400),
            jitter: 0.0,
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = no_jitter(5);
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
        // Capped at max_delay from here on
        assert_eq!(policy.delay_for(4), Duration::from_millis(400));
        assert_eq!(policy.delay_for(10), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn stops_after_budget() {
        let policy = RetryPolicy {
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            ..no_jitter(3)
        };
        let calls = AtomicU32::new(0);
        let result: Result<(), &str> = policy
            .run("always_fails", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("boom") }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn succeeds_after_transient_failure() {
        let policy = RetryPolicy {
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            ..no_jitter(3)
        };
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = policy
            .run("flaky", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { if n == 0 { Err("boom") } else { Ok(n) } }
            })
            .await;
        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
