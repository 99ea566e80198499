//! Menu 360 realtime order synchronization core
//!
//! Keeps staff dashboards, kitchen views and customer screens consistent
//! with a live, multi-writer order stream. Four components compose into a
//! sync session:
//!
//! ```text
//! ChangeFeed ──▶ SyncSession ──▶ SnapshotFetcher ──▶ partition()
//!     │              │                                   │
//!     │              └──▶ NotificationDispatcher         ▼
//!     ▼                      (toast / sound)      watch<OrderPartitions>
//! watch<SubscriptionStatus>
//! ```
//!
//! A change event triggers an authoritative snapshot reload; the view
//! materializer re-partitions the result; the dispatcher independently
//! raises a one-shot notification for the same event. Connection state is
//! exposed so the UI can show connected / disconnected / error.

pub mod config;
pub mod error;
pub mod feed;
pub mod logger;
pub mod notify;
pub mod retry;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod view;

pub use config::SyncConfig;
pub use error::{FetchError, SideEffectError, SubscribeError};
pub use feed::{ChangeFeed, FeedSubscription, memory::MemoryFeed};
pub use notify::{
    NotificationCenter, NotificationDispatcher, SoundCue, SoundPlayer, Toast, ToastSink,
    ToastVariant, plan_notification,
};
pub use retry::RetryPolicy;
pub use session::{OrderSyncSession, SyncSessionBuilder};
pub use snapshot::{Snapshot, SnapshotFetcher};
pub use store::{OrderStore, memory::MemoryOrderStore, rest::RestOrderStore};
pub use view::{OrderPartitions, partition};
