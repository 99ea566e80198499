//! Order Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix used by seeded demo rows; demo data is filtered out of live views.
pub const DEMO_ID_PREFIX: &str = "demo-";

/// Order status
///
/// Happy path is `Pending → Preparing → Ready → Served/Completed`.
/// Cancellation may happen from any non-terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Served,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Terminal states: no further staff transition expected.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Served | Self::Completed | Self::Cancelled)
    }

    /// Orders that still need staff attention.
    pub fn is_open(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Preparing => write!(f, "preparing"),
            Self::Ready => write!(f, "ready"),
            Self::Served => write!(f, "served"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
    Refunded,
}

/// Order line item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct OrderItem {
    pub name: String,
    /// Unit price in currency unit
    pub unit_price: f64,
    pub quantity: i32,
    pub special_instructions: Option<String>,
}

/// Order entity (one customer purchase instance)
///
/// Rows arriving over the change feed may be partial, so every field
/// defaults when absent. `table_number` is the canonical table field name
/// at the backend boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Order {
    pub id: String,
    pub restaurant_id: String,
    pub table_number: String,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub items: Vec<OrderItem>,
    /// Total amount in currency unit
    pub total_amount: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Seeded demo row, excluded from live views when requested.
    pub fn is_demo(&self) -> bool {
        self.id.starts_with(DEMO_ID_PREFIX)
    }
}
