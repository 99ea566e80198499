//! View Materializer
//!
//! Derives stable UI-facing partitions from the authoritative order list
//! without re-fetching. Pure: same input list, same output partition.

use shared::{Order, OrderStatus};

/// Named status buckets exposed to the UI layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPartitions {
    /// Orders still needing staff attention.
    pub active: Vec<Order>,
    /// Served or completed orders.
    pub completed: Vec<Order>,
}

impl OrderPartitions {
    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.completed.is_empty()
    }
}

/// Partition orders into `active` / `completed` buckets.
///
/// - `active`: status not in {completed, served, cancelled}
/// - `completed`: status in {completed, served}
///
/// Cancelled orders appear in neither bucket (see DESIGN.md). The fetcher's
/// sort order is preserved; this never re-sorts.
pub fn partition(orders: &[Order]) -> OrderPartitions {
    let mut partitions = OrderPartitions::default();
    for order in orders {
        match order.status {
            OrderStatus::Completed | OrderStatus::Served => {
                partitions.completed.push(order.clone())
            }
            OrderStatus::Cancelled => {}
            _ => partitions.active.push(order.clone()),
        }
    }
    partitions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str, status: OrderStatus) -> Order {
        Order {
            id: id.into(),
            status,
            ..Default::default()
        }
    }

    #[test]
    fn buckets_are_disjoint_and_complete() {
        let statuses = [
            OrderStatus::Pending,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Served,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ];
        let orders: Vec<Order> = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| order(&format!("o{i}"), *s))
            .collect();

        let p = partition(&orders);
        let cancelled = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Cancelled)
            .count();

        // Every order lands in exactly one of: active, completed, cancelled.
        assert_eq!(p.active.len() + p.completed.len() + cancelled, orders.len());
        for a in &p.active {
            assert!(!p.completed.iter().any(|c| c.id == a.id));
        }
        assert_eq!(p.active.len(), 3);
        assert_eq!(p.completed.len(), 2);
    }

    #[test]
    fn preserves_input_order() {
        let orders = vec![
            order("b", OrderStatus::Pending),
            order("a", OrderStatus::Preparing),
            order("c", OrderStatus::Pending),
        ];
        let p = partition(&orders);
        let ids: Vec<&str> = p.active.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn same_input_same_output() {
        let orders = vec![
            order("x", OrderStatus::Served),
            order("y", OrderStatus::Cancelled),
        ];
        assert_eq!(partition(&orders), partition(&orders));
    }
}
