//! Waiter Request Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Waiter request status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WaiterRequestStatus {
    #[default]
    Pending,
    Acknowledged,
    Completed,
}

/// Waiter call raised from a table (customer pressed "call waiter")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct WaiterRequest {
    pub id: String,
    pub restaurant_id: String,
    pub table_number: String,
    pub status: WaiterRequestStatus,
    pub created_at: Option<DateTime<Utc>>,
}
