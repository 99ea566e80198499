//! Order row store
//!
//! The authoritative read side. [`OrderStore`] is the backend seam; the
//! pure filter/sort helpers in this module define the exact query
//! semantics, shared by the in-memory store and the tests that pin the
//! REST store's expected ordering.

pub mod memory;
pub mod rest;

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{Order, OrderFilters, SortBy, SortDirection};

use crate::error::FetchError;

/// Authoritative, idempotent, side-effect-free order read.
///
/// May be invoked repeatedly (once per change event) without accumulating
/// state. Returns the matching rows plus the match count.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn fetch_orders(
        &self,
        restaurant_id: &str,
        filters: &OrderFilters,
    ) -> Result<(Vec<Order>, usize), FetchError>;
}

/// Apply status/date/demo filters, then sort. Consumes and returns the rows.
pub fn apply_filters(orders: Vec<Order>, filters: &OrderFilters) -> Vec<Order> {
    let mut rows: Vec<Order> = orders
        .into_iter()
        .filter(|o| filters.status.is_none_or(|s| o.status == s))
        .filter(|o| {
            filters
                .start_date
                .is_none_or(|start| created_at_or_epoch(o) >= start)
        })
        .filter(|o| {
            filters
                .end_date
                .is_none_or(|end| created_at_or_epoch(o) <= end)
        })
        .filter(|o| !filters.exclude_demo || !o.is_demo())
        .collect();
    sort_orders(&mut rows, filters.sort_by, filters.sort_direction);
    rows
}

/// Stable sort: ties keep input order under either direction.
///
/// Strings compare lexicographically, `total_amount` numerically with NaN
/// as zero, dates as instants with missing values as epoch zero (sorted
/// first under ascending).
pub fn sort_orders(orders: &mut [Order], sort_by: SortBy, direction: SortDirection) {
    let cmp = |a: &Order, b: &Order| -> Ordering {
        match sort_by {
            SortBy::CreatedAt => created_at_or_epoch(a).cmp(&created_at_or_epoch(b)),
            SortBy::TotalAmount => amount_or_zero(a).total_cmp(&amount_or_zero(b)),
            SortBy::CustomerName => a
                .customer_name
                .as_deref()
                .unwrap_or("")
                .cmp(b.customer_name.as_deref().unwrap_or("")),
        }
    };
    match direction {
        SortDirection::Asc => orders.sort_by(cmp),
        SortDirection::Desc => orders.sort_by(|a, b| cmp(b, a)),
    }
}

fn created_at_or_epoch(order: &Order) -> DateTime<Utc> {
    order.created_at.unwrap_or(DateTime::UNIX_EPOCH)
}

fn amount_or_zero(order: &Order) -> f64 {
    if order.total_amount.is_nan() {
        0.0
    } else {
        order.total_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use shared::OrderStatus;

    fn order(id: &str, status: OrderStatus, total: f64, day: Option<u32>) -> Order {
        Order {
            id: id.into(),
            status,
            total_amount: total,
            created_at: day.map(|d| Utc.with_ymd_and_hms(2026, 8, d, 12, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn filters_completed_sorted_by_amount_desc() {
        let rows = vec![
            order("a", OrderStatus::Completed, 10.0, Some(1)),
            order("b", OrderStatus::Pending, 99.0, Some(2)),
            order("c", OrderStatus::Completed, 30.0, Some(3)),
            order("d", OrderStatus::Completed, 30.0, Some(4)),
            order("e", OrderStatus::Completed, 5.0, Some(5)),
        ];
        let filters = OrderFilters::default()
            .with_status(OrderStatus::Completed)
            .sorted_by(SortBy::TotalAmount, SortDirection::Desc);

        let result = apply_filters(rows, &filters);
        let ids: Vec<&str> = result.iter().map(|o| o.id.as_str()).collect();
        // Ties (c, d) keep input order under descending sort.
        assert_eq!(ids, vec!["c", "d", "a", "e"]);
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let rows = vec![
            order("a", OrderStatus::Pending, 0.0, Some(1)),
            order("b", OrderStatus::Pending, 0.0, Some(2)),
            order("c", OrderStatus::Pending, 0.0, Some(3)),
            order("missing", OrderStatus::Pending, 0.0, None),
        ];
        let filters = OrderFilters::default().with_date_range(
            Utc.with_ymd_and_hms(2026, 8, 2, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 8, 3, 12, 0, 0).unwrap(),
        );
        let result = apply_filters(rows, &filters);
        let ids: Vec<&str> = result.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
    }

    #[test]
    fn missing_created_at_sorts_first_ascending() {
        let mut rows = vec![
            order("late", OrderStatus::Pending, 0.0, Some(9)),
            order("never", OrderStatus::Pending, 0.0, None),
            order("early", OrderStatus::Pending, 0.0, Some(1)),
        ];
        sort_orders(&mut rows, SortBy::CreatedAt, SortDirection::Asc);
        let ids: Vec<&str> = rows.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["never", "early", "late"]);
    }

    #[test]
    fn nan_amount_sorts_as_zero() {
        let mut rows = vec![
            order("nan", OrderStatus::Pending, f64::NAN, None),
            order("neg", OrderStatus::Pending, -1.0, None),
            order("pos", OrderStatus::Pending, 1.0, None),
        ];
        sort_orders(&mut rows, SortBy::TotalAmount, SortDirection::Asc);
        let ids: Vec<&str> = rows.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["neg", "nan", "pos"]);
    }

    #[test]
    fn customer_name_lexicographic() {
        let mut rows: Vec<Order> = [("b", "Bea"), ("a", "Ada"), ("n", "")]
            .iter()
            .map(|(id, name)| Order {
                id: (*id).into(),
                customer_name: (!name.is_empty()).then(|| (*name).to_string()),
                ..Default::default()
            })
            .collect();
        sort_orders(&mut rows, SortBy::CustomerName, SortDirection::Asc);
        let ids: Vec<&str> = rows.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["n", "a", "b"]);
    }

    #[test]
    fn demo_rows_excluded_on_request() {
        let rows = vec![
            order("demo-1", OrderStatus::Pending, 0.0, None),
            order("o1", OrderStatus::Pending, 0.0, None),
        ];
        let result = apply_filters(rows, &OrderFilters::default().without_demo_data());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "o1");
    }
}
