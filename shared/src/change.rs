//! Change feed event types
//!
//! These types describe one committed row mutation as delivered by the
//! backend's change-data-capture stream. Events are ephemeral: produced by
//! a subscription, consumed synchronously by handlers, never persisted.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical subscription target, scoped to one restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Orders,
    WaiterRequests,
}

impl Topic {
    /// Backend table name this topic maps to.
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::WaiterRequests => "waiter_requests",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table_name())
    }
}

/// Kind of row mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert => write!(f, "INSERT"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// One notified mutation from the change feed.
///
/// `new` carries the row state after the mutation (insert/update),
/// `old` the state before it (update/delete). Rows are raw JSON so a
/// single event type serves every topic; use [`ChangeEvent::decode_new`]
/// / [`ChangeEvent::decode_old`] to project into a typed model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub topic: Topic,
    pub schema: String,
    /// Filter context: the restaurant this event was scoped to.
    pub restaurant_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old: Option<serde_json::Value>,
}

/// Failure to project an event row into a typed model.
#[derive(Debug, thiserror::Error)]
pub enum ChangeDecodeError {
    #[error("event carries no {0} row")]
    MissingRow(&'static str),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ChangeEvent {
    pub fn insert(topic: Topic, restaurant_id: impl Into<String>, new: serde_json::Value) -> Self {
        Self {
            kind: ChangeKind::Insert,
            topic,
            schema: "public".to_string(),
            restaurant_id: restaurant_id.into(),
            new: Some(new),
            old: None,
        }
    }

    pub fn update(
        topic: Topic,
        restaurant_id: impl Into<String>,
        old: serde_json::Value,
        new: serde_json::Value,
    ) -> Self {
        Self {
            kind: ChangeKind::Update,
            topic,
            schema: "public".to_string(),
            restaurant_id: restaurant_id.into(),
            new: Some(new),
            old: Some(old),
        }
    }

    pub fn delete(topic: Topic, restaurant_id: impl Into<String>, old: serde_json::Value) -> Self {
        Self {
            kind: ChangeKind::Delete,
            topic,
            schema: "public".to_string(),
            restaurant_id: restaurant_id.into(),
            new: None,
            old: Some(old),
        }
    }

    /// Decode the post-mutation row.
    pub fn decode_new<T: DeserializeOwned>(&self) -> Result<T, ChangeDecodeError> {
        let row = self
            .new
            .clone()
            .ok_or(ChangeDecodeError::MissingRow("new"))?;
        Ok(serde_json::from_value(row)?)
    }

    /// Decode the pre-mutation row (update/delete only).
    pub fn decode_old<T: DeserializeOwned>(&self) -> Result<T, ChangeDecodeError> {
        let row = self
            .old
            .clone()
            .ok_or(ChangeDecodeError::MissingRow("old"))?;
        Ok(serde_json::from_value(row)?)
    }

    /// Whether the row payload actually changed (guards no-op updates).
    pub fn row_changed(&self) -> bool {
        match self.kind {
            ChangeKind::Update => self.new != self.old,
            _ => true,
        }
    }
}
