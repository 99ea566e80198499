//! In-memory order store
//!
//! Same query semantics as the REST store, applied locally through the
//! pure helpers in [`super`]. Used by tests and demos; supports fault and
//! latency injection so retry/timeout/stale-fetch behavior can be
//! exercised deterministically.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use shared::{Order, OrderFilters};

use super::{OrderStore, apply_filters};
use crate::error::FetchError;

#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    rows: RwLock<Vec<Order>>,
    /// Fail this many upcoming fetches with a backend error.
    fail_remaining: AtomicU32,
    latency: RwLock<Duration>,
    fetches: AtomicU32,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a row by id, preserving insertion order.
    pub fn upsert(&self, order: Order) {
        let mut rows = self.rows.write().unwrap();
        if let Some(existing) = rows.iter_mut().find(|o| o.id == order.id) {
            *existing = order;
        } else {
            rows.push(order);
        }
    }

    pub fn remove(&self, id: &str) {
        self.rows.write().unwrap().retain(|o| o.id != id);
    }

    pub fn len(&self) -> usize {
        self.rows.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make the next `n` fetches fail with a backend error.
    pub fn fail_next(&self, n: u32) {
        self.fail_remaining.store(n, Ordering::SeqCst);
    }

    /// Artificial delay applied to every fetch.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.write().unwrap() = latency;
    }

    /// Number of fetches started so far.
    pub fn fetch_count(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn fetch_orders(
        &self,
        restaurant_id: &str,
        filters: &OrderFilters,
    ) -> Result<(Vec<Order>, usize), FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        // Rows are captured up front, so injected latency models a read
        // that began before later writes.
        let rows: Vec<Order> = self
            .rows
            .read()
            .unwrap()
            .iter()
            .filter(|o| o.restaurant_id == restaurant_id)
            .cloned()
            .collect();

        let latency = *self.latency.read().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if self
            .fail_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(FetchError::Backend("injected failure".to_string()));
        }

        let rows = apply_filters(rows, filters);
        let count = rows.len();
        Ok((rows, count))
    }
}
