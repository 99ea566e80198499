//! Snapshot query filters
//!
//! Filter and sort parameters for authoritative order reads. The sort
//! column names match the backend table columns so the REST store can pass
//! them through unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::OrderStatus;

/// Sortable order columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    CreatedAt,
    TotalAmount,
    CustomerName,
}

impl SortBy {
    /// Backend column name.
    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::TotalAmount => "total_amount",
            Self::CustomerName => "customer_name",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    /// Newest / largest first — the dashboard default.
    #[default]
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// Recognized snapshot query options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OrderFilters {
    /// Exact status match; `None` = all statuses.
    pub status: Option<OrderStatus>,
    /// Inclusive lower bound on `created_at`.
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub end_date: Option<DateTime<Utc>>,
    pub sort_by: SortBy,
    pub sort_direction: SortDirection,
    /// Drop seeded demo rows from the result.
    pub exclude_demo: bool,
}

impl OrderFilters {
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_date_range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn sorted_by(mut self, sort_by: SortBy, direction: SortDirection) -> Self {
        self.sort_by = sort_by;
        self.sort_direction = direction;
        self
    }

    pub fn without_demo_data(mut self) -> Self {
        self.exclude_demo = true;
        self
    }
}
