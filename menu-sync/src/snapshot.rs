//! Snapshot Fetcher
//!
//! Wraps an [`OrderStore`] with the operational contract the sync loop
//! needs: a bounded deadline per attempt, exactly one delayed retry on
//! failure, and a monotonic generation tag so a late result from an older
//! fetch can never overwrite a newer one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use shared::{Order, OrderFilters};

use crate::error::FetchError;
use crate::retry::RetryPolicy;
use crate::store::OrderStore;

/// One completed authoritative read.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub orders: Vec<Order>,
    pub count: usize,
    /// Monotonic tag assigned when the fetch *started*. Apply a snapshot
    /// only if its generation exceeds the last applied one.
    pub generation: u64,
}

pub struct SnapshotFetcher {
    store: Arc<dyn OrderStore>,
    timeout: Duration,
    retry: RetryPolicy,
    generation: AtomicU64,
}

impl SnapshotFetcher {
    pub fn new(store: Arc<dyn OrderStore>, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            store,
            timeout,
            retry,
            generation: AtomicU64::new(0),
        }
    }

    /// Fetch the authoritative order list.
    ///
    /// Each attempt is bounded by the configured timeout; a failed attempt
    /// is retried per the policy (single bounded retry by default). The
    /// returned generation reflects fetch start order, so results of
    /// overlapping fetches can be applied latest-wins.
    pub async fn fetch(
        &self,
        restaurant_id: &str,
        filters: &OrderFilters,
    ) -> Result<Snapshot, FetchError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let timeout = self.timeout;

        let (orders, count) = self
            .retry
            .run("orders snapshot fetch", || {
                let store = Arc::clone(&self.store);
                let filters = filters.clone();
                let restaurant_id = restaurant_id.to_string();
                async move {
                    match tokio::time::timeout(
                        timeout,
                        store.fetch_orders(&restaurant_id, &filters),
                    )
                    .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(FetchError::Timeout(timeout)),
                    }
                }
            })
            .await?;

        Ok(Snapshot {
            orders,
            count,
            generation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryOrderStore;
    use shared::OrderStatus;

    fn store_with_one_order() -> Arc<MemoryOrderStore> {
        let store = Arc::new(MemoryOrderStore::new());
        store.upsert(Order {
            id: "o1".into(),
            restaurant_id: "r1".into(),
            status: OrderStatus::Pending,
            ..Default::default()
        });
        store
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: 0.0,
        }
    }

    #[tokio::test]
    async fn retries_once_then_succeeds() {
        let store = store_with_one_order();
        store.fail_next(1);
        let fetcher = SnapshotFetcher::new(store.clone(), Duration::from_secs(5), fast_retry());

        let snapshot = fetcher
            .fetch("r1", &OrderFilters::default())
            .await
            .unwrap();
        assert_eq!(snapshot.count, 1);
    }

    #[tokio::test]
    async fn gives_up_after_single_retry() {
        let store = store_with_one_order();
        store.fail_next(2);
        let fetcher = SnapshotFetcher::new(store.clone(), Duration::from_secs(5), fast_retry());

        let result = fetcher.fetch("r1", &OrderFilters::default()).await;
        assert!(matches!(result, Err(FetchError::Backend(_))));
        // Budget spent: exactly two attempts, the third would have passed.
        assert!(
            store
                .fetch_orders("r1", &OrderFilters::default())
                .await
                .is_ok()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_times_out() {
        let store = store_with_one_order();
        store.set_latency(Duration::from_secs(60));
        let fetcher = SnapshotFetcher::new(
            store,
            Duration::from_millis(100),
            RetryPolicy {
                max_attempts: 1,
                base_delay: Duration::ZERO,
                max_delay: Duration::ZERO,
                jitter: 0.0,
            },
        );

        let result = fetcher.fetch("r1", &OrderFilters::default()).await;
        assert!(matches!(result, Err(FetchError::Timeout(_))));
    }

    #[tokio::test]
    async fn generations_are_monotonic() {
        let store = store_with_one_order();
        let fetcher = SnapshotFetcher::new(store, Duration::from_secs(5), fast_retry());

        let first = fetcher.fetch("r1", &OrderFilters::default()).await.unwrap();
        let second = fetcher.fetch("r1", &OrderFilters::default()).await.unwrap();
        assert!(second.generation > first.generation);
    }

    #[tokio::test(start_paused = true)]
    async fn late_result_of_older_fetch_is_identifiable() {
        let store = store_with_one_order();
        let fetcher = Arc::new(SnapshotFetcher::new(
            store.clone(),
            Duration::from_secs(30),
            RetryPolicy {
                max_attempts: 1,
                base_delay: Duration::ZERO,
                max_delay: Duration::ZERO,
                jitter: 0.0,
            },
        ));

        // Fetch A starts first against a slow store.
        store.set_latency(Duration::from_secs(10));
        let slow_fetcher = Arc::clone(&fetcher);
        let slow = tokio::spawn(async move {
            slow_fetcher.fetch("r1", &OrderFilters::default()).await
        });
        tokio::task::yield_now().await;

        // Fetch B starts later but resolves first.
        store.set_latency(Duration::ZERO);
        let fast = fetcher.fetch("r1", &OrderFilters::default()).await.unwrap();

        let slow = slow.await.unwrap().unwrap();
        assert!(slow.generation < fast.generation);

        // Latest-wins application discards the late, older result.
        let mut last_applied = 0u64;
        for snapshot in [fast, slow] {
            if snapshot.generation > last_applied {
                last_applied = snapshot.generation;
            }
        }
        assert_eq!(last_applied, 2);
    }
}
