//! Error taxonomy
//!
//! Backend errors are caught at the boundary of each async operation and
//! converted to local state (status values, error results), never thrown
//! through the render path:
//!
//! - [`SubscribeError`] — channel failed to establish; thereafter failures
//!   surface as [`shared::SubscriptionStatus`] values.
//! - [`FetchError`] — snapshot read failed; surfaced via a one-shot alert
//!   plus at most one bounded retry.
//! - [`SideEffectError`] — sound/toast failure; logged only, never user
//!   visible, never interrupts state updates.

use std::time::Duration;

/// Change feed subscription failed to establish.
#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    #[error("backend rejected subscription: {0}")]
    Rejected(String),
    #[error("change feed is closed")]
    Closed,
}

/// Authoritative snapshot read failed.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A notification side effect (sound, toast) failed.
///
/// Best-effort by contract: callers log and continue.
#[derive(Debug, thiserror::Error)]
#[error("notification side effect failed: {0}")]
pub struct SideEffectError(pub String);
