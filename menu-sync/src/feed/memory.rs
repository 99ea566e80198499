//! In-process change feed
//!
//! Broadcast-channel backed [`ChangeFeed`] for tests, demos and same-process
//! wiring. Each subscription gets its own forwarding task that filters the
//! firehose down to one (restaurant, topic) pair.

use async_trait::async_trait;
use shared::{ChangeEvent, SubscriptionStatus, Topic};
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::{ChangeFeed, FeedSubscription};
use crate::error::SubscribeError;

/// In-memory change feed.
///
/// Clone of the publishing side is cheap; all subscriptions share one
/// broadcast channel and filter locally.
#[derive(Debug, Clone)]
pub struct MemoryFeed {
    tx: broadcast::Sender<ChangeEvent>,
    forward_capacity: usize,
}

impl MemoryFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            forward_capacity: capacity.max(1),
        }
    }

    /// Handle for producing events (the "backend writer" side).
    pub fn publisher(&self) -> FeedPublisher {
        FeedPublisher {
            tx: self.tx.clone(),
        }
    }
}

impl Default for MemoryFeed {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Producer handle for a [`MemoryFeed`].
#[derive(Debug, Clone)]
pub struct FeedPublisher {
    tx: broadcast::Sender<ChangeEvent>,
}

impl FeedPublisher {
    /// Publish a change event; returns the number of live subscriptions it
    /// reached (0 when nobody is listening — not an error).
    pub fn publish(&self, event: ChangeEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }
}

#[async_trait]
impl ChangeFeed for MemoryFeed {
    async fn subscribe(
        &self,
        topic: Topic,
        restaurant_id: &str,
    ) -> Result<FeedSubscription, SubscribeError> {
        let mut source = self.tx.subscribe();
        let (event_tx, event_rx) = mpsc::channel(self.forward_capacity);
        let (status_tx, status_rx) = watch::channel(SubscriptionStatus::Disconnected);
        let cancel = CancellationToken::new();

        let task_cancel = cancel.clone();
        let rid = restaurant_id.to_string();
        tokio::spawn(async move {
            // In-process feeds acknowledge immediately.
            let _ = status_tx.send(SubscriptionStatus::Connected);

            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => {
                        tracing::debug!(%topic, restaurant_id = %rid, "subscription released");
                        break;
                    }
                    msg = source.recv() => match msg {
                        Ok(event) => {
                            if event.topic == topic && event.restaurant_id == rid
                                && event_tx.send(event).await.is_err()
                            {
                                // Consumer dropped its receiver.
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            // Missed events; the consumer reconciles through
                            // its next snapshot reload.
                            tracing::warn!(skipped, %topic, "change feed lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            let _ = status_tx.send(SubscriptionStatus::Error);
                            tracing::warn!(%topic, restaurant_id = %rid, "change feed closed");
                            break;
                        }
                    }
                }
            }
        });

        Ok(FeedSubscription::new(event_rx, status_rx, cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn insert(rid: &str, id: &str) -> ChangeEvent {
        ChangeEvent::insert(Topic::Orders, rid, json!({"id": id}))
    }

    #[tokio::test]
    async fn filters_by_restaurant_and_topic() {
        let feed = MemoryFeed::new(16);
        let publisher = feed.publisher();
        let mut sub = feed.subscribe(Topic::Orders, "r1").await.unwrap();

        publisher.publish(insert("r2", "other-restaurant"));
        publisher.publish(ChangeEvent::insert(
            Topic::WaiterRequests,
            "r1",
            json!({"id": "w1"}),
        ));
        publisher.publish(insert("r1", "mine"));

        let event = sub.recv().await.unwrap();
        let id = event.new.unwrap()["id"].as_str().unwrap().to_string();
        assert_eq!(id, "mine");
    }

    #[tokio::test]
    async fn unsubscribe_is_idempotent() {
        let feed = MemoryFeed::new(16);
        let publisher = feed.publisher();
        let mut sub = feed.subscribe(Topic::Orders, "r1").await.unwrap();

        sub.unsubscribe();
        sub.unsubscribe();
        assert!(sub.is_closed());

        // Channel is closed for good: nothing is delivered afterwards.
        tokio::task::yield_now().await;
        publisher.publish(insert("r1", "late"));
        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn status_transitions_in_order() {
        let feed = MemoryFeed::new(16);
        let sub = feed.subscribe(Topic::Orders, "r1").await.unwrap();
        let mut status = sub.status_stream();

        // Initial state observed before the forward task runs.
        assert_eq!(*status.borrow(), SubscriptionStatus::Disconnected);

        status.changed().await.unwrap();
        assert_eq!(*status.borrow(), SubscriptionStatus::Connected);

        // All senders gone: the channel reports a fatal condition.
        drop(feed);
        status.changed().await.unwrap();
        assert_eq!(*status.borrow(), SubscriptionStatus::Error);
    }

    #[tokio::test]
    async fn events_arrive_in_publish_order() {
        let feed = MemoryFeed::new(16);
        let publisher = feed.publisher();
        let mut sub = feed.subscribe(Topic::Orders, "r1").await.unwrap();

        for i in 0..5 {
            publisher.publish(insert("r1", &format!("o{i}")));
        }
        for i in 0..5 {
            let event = sub.recv().await.unwrap();
            let id = event.new.unwrap()["id"].as_str().unwrap().to_string();
            assert_eq!(id, format!("o{i}"));
        }
    }
}
