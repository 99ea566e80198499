//! Order Sync Session
//!
//! The composition root: one parameterized component wiring change feed →
//! snapshot reload → view partitions → notification dispatch for a single
//! (restaurant, view) pair, configured per call site instead of one
//! hand-rolled loop per dashboard.
//!
//! ```text
//! orders feed ──┐
//!               ├─ select loop ── dispatch notification
//! waiter feed ──┘       │
//!                       └─ spawn fetch ──▶ snapshots ──▶ latest-wins apply
//!                                                              │
//!                                                   watch<OrderPartitions>
//! ```
//!
//! Snapshot fetches run as spawned tasks so an in-flight fetch never delays
//! event dispatch; results are applied latest-generation-wins, and anything
//! arriving after shutdown is discarded.

use std::sync::Arc;

use shared::{OrderFilters, SubscriptionStatus, Topic};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::SyncConfig;
use crate::error::{FetchError, SubscribeError};
use crate::feed::{ChangeFeed, FeedSubscription};
use crate::notify::{NotificationCenter, NotificationDispatcher, SoundPlayer, Toast, ToastSink, ToastVariant};
use crate::retry::RetryPolicy;
use crate::snapshot::{Snapshot, SnapshotFetcher};
use crate::store::OrderStore;
use crate::view::{OrderPartitions, partition};

/// Builder for [`OrderSyncSession`].
pub struct SyncSessionBuilder {
    feed: Arc<dyn ChangeFeed>,
    store: Arc<dyn OrderStore>,
    restaurant_id: String,
    filters: OrderFilters,
    config: SyncConfig,
    sound: Option<Arc<dyn SoundPlayer>>,
    toast: Option<Arc<dyn ToastSink>>,
}

impl SyncSessionBuilder {
    pub fn filters(mut self, filters: OrderFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    pub fn sound_player(mut self, player: Arc<dyn SoundPlayer>) -> Self {
        self.sound = Some(player);
        self
    }

    pub fn toast_sink(mut self, sink: Arc<dyn ToastSink>) -> Self {
        self.toast = Some(sink);
        self
    }

    /// Subscribe and start the sync loop.
    pub async fn start(self) -> Result<OrderSyncSession, SubscribeError> {
        let orders_sub = self
            .feed
            .subscribe(Topic::Orders, &self.restaurant_id)
            .await?;
        let waiter_sub = self
            .feed
            .subscribe(Topic::WaiterRequests, &self.restaurant_id)
            .await?;

        let center = Arc::new(NotificationCenter::new(self.config.max_notifications));
        let dispatcher = NotificationDispatcher::new(
            center.clone(),
            self.sound,
            self.toast.clone(),
            self.config.sound_enabled,
        );
        let fetcher = Arc::new(SnapshotFetcher::new(
            self.store,
            self.config.fetch_timeout(),
            self.config.fetch_retry(),
        ));

        let (partitions_tx, partitions_rx) = watch::channel(OrderPartitions::default());
        // Session-owned status channel: survives resubscription, unlike the
        // per-subscription stream.
        let (status_tx, status_rx) = watch::channel(SubscriptionStatus::Disconnected);
        let cancel = CancellationToken::new();

        let worker = SessionWorker {
            feed: self.feed,
            restaurant_id: self.restaurant_id,
            filters: self.filters,
            fetcher,
            dispatcher,
            toast: self.toast,
            resubscribe_retry: RetryPolicy::resubscribe_default(),
            partitions_tx,
            status_tx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(worker.run(orders_sub, waiter_sub));

        Ok(OrderSyncSession {
            partitions: partitions_rx,
            status: status_rx,
            notifications: center,
            cancel,
            task: Some(task),
        })
    }
}

/// Live sync session for one restaurant view.
pub struct OrderSyncSession {
    partitions: watch::Receiver<OrderPartitions>,
    status: watch::Receiver<SubscriptionStatus>,
    notifications: Arc<NotificationCenter>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl OrderSyncSession {
    pub fn builder(
        feed: Arc<dyn ChangeFeed>,
        store: Arc<dyn OrderStore>,
        restaurant_id: impl Into<String>,
    ) -> SyncSessionBuilder {
        SyncSessionBuilder {
            feed,
            store,
            restaurant_id: restaurant_id.into(),
            filters: OrderFilters::default(),
            config: SyncConfig::default(),
            sound: None,
            toast: None,
        }
    }

    /// Observe partition updates.
    pub fn partitions(&self) -> watch::Receiver<OrderPartitions> {
        self.partitions.clone()
    }

    /// Current partitions snapshot.
    pub fn current_partitions(&self) -> OrderPartitions {
        self.partitions.borrow().clone()
    }

    /// Current connection state of the orders subscription.
    pub fn status(&self) -> SubscriptionStatus {
        *self.status.borrow()
    }

    /// Observe every status transition.
    pub fn status_stream(&self) -> watch::Receiver<SubscriptionStatus> {
        self.status.clone()
    }

    pub fn notifications(&self) -> &Arc<NotificationCenter> {
        &self.notifications
    }

    /// Request teardown. Idempotent; also triggered by [`Self::close`].
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Tear down and wait for the worker to finish.
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for OrderSyncSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct SessionWorker {
    feed: Arc<dyn ChangeFeed>,
    restaurant_id: String,
    filters: OrderFilters,
    fetcher: Arc<SnapshotFetcher>,
    dispatcher: NotificationDispatcher,
    toast: Option<Arc<dyn ToastSink>>,
    resubscribe_retry: RetryPolicy,
    partitions_tx: watch::Sender<OrderPartitions>,
    status_tx: watch::Sender<SubscriptionStatus>,
    cancel: CancellationToken,
}

impl SessionWorker {
    async fn run(self, mut orders_sub: FeedSubscription, mut waiter_sub: FeedSubscription) {
        tracing::info!(restaurant_id = %self.restaurant_id, "sync session started");

        // Snapshot results funnel back through this channel; the loop keeps
        // one sender alive so `recv` below never yields `None`.
        let (snapshot_tx, mut snapshot_rx) =
            mpsc::channel::<Result<Snapshot, FetchError>>(8);
        let mut last_applied: u64 = 0;
        let mut waiter_open = true;

        let mut orders_status = orders_sub.status_stream();
        let mut status_open = true;
        self.publish_status(*orders_status.borrow_and_update());

        // Initial authoritative load.
        self.trigger_fetch(&snapshot_tx);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    orders_sub.unsubscribe();
                    waiter_sub.unsubscribe();
                    tracing::info!(restaurant_id = %self.restaurant_id, "sync session shut down");
                    break;
                }

                event = orders_sub.recv() => match event {
                    Some(event) => {
                        // One dispatcher invocation per event, in delivery
                        // order, independent of the reload.
                        self.dispatcher.dispatch(&event);
                        self.trigger_fetch(&snapshot_tx);
                    }
                    None => {
                        tracing::warn!(restaurant_id = %self.restaurant_id, "orders feed closed, resubscribing");
                        self.publish_status(SubscriptionStatus::Error);
                        tokio::select! {
                            _ = self.cancel.cancelled() => {}
                            result = self.resubscribe(Topic::Orders) => match result {
                                Ok(sub) => {
                                    orders_sub = sub;
                                    orders_status = orders_sub.status_stream();
                                    status_open = true;
                                    self.publish_status(*orders_status.borrow_and_update());
                                    // Reconcile anything missed while the
                                    // channel was down.
                                    self.trigger_fetch(&snapshot_tx);
                                }
                                Err(err) => {
                                    tracing::error!(%err, restaurant_id = %self.restaurant_id, "orders resubscribe failed, stopping session");
                                    break;
                                }
                            }
                        }
                    }
                },

                changed = orders_status.changed(), if status_open => match changed {
                    Ok(()) => self.publish_status(*orders_status.borrow_and_update()),
                    // Sender gone; resubscription replaces the stream.
                    Err(_) => status_open = false,
                },

                event = waiter_sub.recv(), if waiter_open => match event {
                    Some(event) => {
                        self.dispatcher.dispatch(&event);
                    }
                    None => {
                        waiter_open = false;
                        tracing::warn!(restaurant_id = %self.restaurant_id, "waiter request feed closed");
                    }
                },

                result = snapshot_rx.recv() => {
                    if let Some(result) = result {
                        last_applied = self.apply_snapshot(result, last_applied);
                    }
                }
            }
        }
    }

    /// Re-open a dropped subscription through the bounded retry policy.
    async fn resubscribe(&self, topic: Topic) -> Result<FeedSubscription, SubscribeError> {
        self.resubscribe_retry
            .run("change feed resubscribe", || {
                self.feed.subscribe(topic, &self.restaurant_id)
            })
            .await
    }

    /// Forward a status value, suppressing no-op transitions.
    fn publish_status(&self, status: SubscriptionStatus) {
        self.status_tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }

    /// Spawn an authoritative reload without blocking event dispatch.
    fn trigger_fetch(&self, snapshot_tx: &mpsc::Sender<Result<Snapshot, FetchError>>) {
        let fetcher = Arc::clone(&self.fetcher);
        let tx = snapshot_tx.clone();
        let restaurant_id = self.restaurant_id.clone();
        let filters = self.filters.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch(&restaurant_id, &filters).await;
            // Receiver gone means the session is down; drop the result.
            let _ = tx.send(result).await;
        });
    }

    /// Apply a completed fetch, latest generation wins. Returns the new
    /// high-water mark.
    fn apply_snapshot(
        &self,
        result: Result<Snapshot, FetchError>,
        last_applied: u64,
    ) -> u64 {
        match result {
            Ok(snapshot) if snapshot.generation > last_applied => {
                tracing::debug!(
                    generation = snapshot.generation,
                    orders = snapshot.orders.len(),
                    "applying snapshot"
                );
                let _ = self.partitions_tx.send(partition(&snapshot.orders));
                snapshot.generation
            }
            Ok(snapshot) => {
                tracing::debug!(
                    generation = snapshot.generation,
                    last_applied,
                    "stale snapshot discarded"
                );
                last_applied
            }
            Err(err) => {
                // The fetcher already spent its bounded retry attempts.
                tracing::error!(%err, restaurant_id = %self.restaurant_id, "orders snapshot failed");
                if let Some(sink) = &self.toast
                    && let Err(toast_err) = sink.toast(Toast {
                        title: "Connection Problem".to_string(),
                        message: "Failed to load orders. Please check your connection."
                            .to_string(),
                        variant: ToastVariant::Destructive,
                        duration_ms: 5_000,
                    })
                {
                    tracing::warn!(%toast_err, "fetch failure toast failed");
                }
                last_applied
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::memory::MemoryFeed;
    use crate::store::memory::MemoryOrderStore;
    use shared::{ChangeEvent, Order, OrderStatus};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Feed whose first orders subscription dies as soon as it is polled;
    /// later subscriptions delegate to a working in-memory feed.
    struct ReconnectingFeed {
        inner: MemoryFeed,
        orders_subscriptions: AtomicU32,
    }

    #[async_trait::async_trait]
    impl ChangeFeed for ReconnectingFeed {
        async fn subscribe(
            &self,
            topic: Topic,
            restaurant_id: &str,
        ) -> Result<FeedSubscription, SubscribeError> {
            if topic == Topic::Orders
                && self.orders_subscriptions.fetch_add(1, Ordering::SeqCst) == 0
            {
                let (_dead_tx, events) = mpsc::channel(1);
                let (_status_tx, status) = watch::channel(SubscriptionStatus::Disconnected);
                return Ok(FeedSubscription::new(events, status, CancellationToken::new()));
            }
            self.inner.subscribe(topic, restaurant_id).await
        }
    }

    async fn wait_for<F: Fn() -> bool>(predicate: F) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !predicate() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[tokio::test]
    async fn orders_feed_resubscribes_after_close() {
        let feed = Arc::new(ReconnectingFeed {
            inner: MemoryFeed::new(16),
            orders_subscriptions: AtomicU32::new(0),
        });
        let store = Arc::new(MemoryOrderStore::new());
        let publisher = feed.inner.publisher();

        let session = OrderSyncSession::builder(feed.clone(), store.clone(), "r1")
            .start()
            .await
            .unwrap();

        // The dead channel closes immediately; the worker reopens it.
        wait_for(|| feed.orders_subscriptions.load(Ordering::SeqCst) == 2).await;
        wait_for(|| session.status() == SubscriptionStatus::Connected).await;

        // Events on the replacement subscription still flow end to end.
        let order = Order {
            id: "o1".into(),
            restaurant_id: "r1".into(),
            table_number: "5".into(),
            status: OrderStatus::Pending,
            ..Default::default()
        };
        store.upsert(order.clone());
        publisher.publish(ChangeEvent::insert(
            Topic::Orders,
            "r1",
            serde_json::to_value(&order).unwrap(),
        ));

        wait_for(|| session.current_partitions().active.len() == 1).await;
        assert_eq!(session.notifications().unread_count(), 1);

        session.close().await;
    }
}
