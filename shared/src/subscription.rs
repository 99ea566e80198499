//! Subscription status
//!
//! Owned exclusively by the change feed subscriber; read-only to all
//! consumers. Failures surface here as a value, never as a panic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection state of one change feed subscription.
///
/// Transitions: `Disconnected` (initial) → `Connected` (acknowledged by the
/// backend) or → `Error` (backend rejected, or the channel reported a fatal
/// condition).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Disconnected,
    Connected,
    Error,
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connected => write!(f, "connected"),
            Self::Error => write!(f, "error"),
        }
    }
}
