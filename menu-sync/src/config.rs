//! Sync core configuration
//!
//! All knobs can be overridden through environment variables:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | FETCH_TIMEOUT_MS | 10000 | Snapshot fetch deadline |
//! | FETCH_RETRY_DELAY_MS | 1500 | Delay before the single fetch retry |
//! | FEED_CHANNEL_CAPACITY | 256 | Per-subscription event buffer |
//! | MAX_NOTIFICATIONS | 100 | Most-recent-N notification cap |
//! | SOUND_ENABLED | true | Play notification sounds |

use std::time::Duration;

use crate::retry::RetryPolicy;

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Snapshot fetch deadline in milliseconds.
    pub fetch_timeout_ms: u64,
    /// Delay before the single bounded fetch retry, in milliseconds.
    pub fetch_retry_delay_ms: u64,
    /// Buffer capacity of each subscription's event channel.
    pub feed_channel_capacity: usize,
    /// Notification list cap (most recent N kept).
    pub max_notifications: usize,
    /// Whether notification sounds are played at all.
    pub sound_enabled: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 10_000,
            fetch_retry_delay_ms: 1_500,
            feed_channel_capacity: 256,
            max_notifications: 100,
            sound_enabled: true,
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            fetch_timeout_ms: env_parse("FETCH_TIMEOUT_MS", defaults.fetch_timeout_ms),
            fetch_retry_delay_ms: env_parse("FETCH_RETRY_DELAY_MS", defaults.fetch_retry_delay_ms),
            feed_channel_capacity: env_parse(
                "FEED_CHANNEL_CAPACITY",
                defaults.feed_channel_capacity,
            ),
            max_notifications: env_parse("MAX_NOTIFICATIONS", defaults.max_notifications),
            sound_enabled: env_parse("SOUND_ENABLED", defaults.sound_enabled),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Fetch retry policy: exactly one bounded delayed retry, no jitter.
    pub fn fetch_retry(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(self.fetch_retry_delay_ms),
            max_delay: Duration::from_millis(self.fetch_retry_delay_ms),
            jitter: 0.0,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
