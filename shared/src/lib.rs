//! Shared types for the Menu 360 realtime sync core
//!
//! Domain models, change-feed event types, notification types and
//! query filters used by both the sync core and its consumers.

pub mod change;
pub mod filters;
pub mod models;
pub mod notification;
pub mod subscription;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use change::{ChangeDecodeError, ChangeEvent, ChangeKind, Topic};
pub use filters::{OrderFilters, SortBy, SortDirection};
pub use models::{Order, OrderItem, OrderStatus, PaymentStatus, WaiterRequest, WaiterRequestStatus};
pub use notification::{Notification, NotificationLevel, NotificationType};
pub use subscription::SubscriptionStatus;
