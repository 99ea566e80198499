//! Domain models

pub mod order;
pub mod waiter_request;

pub use order::{Order, OrderItem, OrderStatus, PaymentStatus};
pub use waiter_request::{WaiterRequest, WaiterRequestStatus};
