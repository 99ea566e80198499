//! Change Feed Subscriber
//!
//! Opens and maintains a subscription to a named, filtered change stream
//! (one (restaurant, topic) pair per handle) and reports connection state
//! through a watch channel. The subscriber never mutates application state;
//! it only forwards [`ChangeEvent`]s to the consumer.
//!
//! Subscription failures surface as [`SubscriptionStatus`] values, never as
//! panics. There is no silent automatic retry: resubscribing is the
//! consumer's call and goes through [`crate::retry::RetryPolicy`].

pub mod memory;

use async_trait::async_trait;
use shared::{ChangeEvent, SubscriptionStatus, Topic};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::error::SubscribeError;

/// Backend change-data-capture seam.
///
/// Implementations deliver every committed insert/update/delete on `topic`
/// scoped to `restaurant_id`, in commit order.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    async fn subscribe(
        &self,
        topic: Topic,
        restaurant_id: &str,
    ) -> Result<FeedSubscription, SubscribeError>;
}

/// Handle to one live subscription.
///
/// Must be released on consumer teardown; dropping the handle or calling
/// [`FeedSubscription::unsubscribe`] (idempotent, safe to call repeatedly)
/// closes the channel. One handle, one channel — never one per render.
#[derive(Debug)]
pub struct FeedSubscription {
    events: mpsc::Receiver<ChangeEvent>,
    status: watch::Receiver<SubscriptionStatus>,
    cancel: CancellationToken,
}

impl FeedSubscription {
    pub fn new(
        events: mpsc::Receiver<ChangeEvent>,
        status: watch::Receiver<SubscriptionStatus>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            events,
            status,
            cancel,
        }
    }

    /// Receive the next change event in delivery order.
    ///
    /// Returns `None` once the subscription is closed and the buffer is
    /// drained.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.events.recv().await
    }

    /// Current connection state.
    pub fn status(&self) -> SubscriptionStatus {
        *self.status.borrow()
    }

    /// Observe every status transition.
    pub fn status_stream(&self) -> watch::Receiver<SubscriptionStatus> {
        self.status.clone()
    }

    /// Release the channel. Idempotent: calling twice neither panics nor
    /// reopens anything.
    pub fn unsubscribe(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
