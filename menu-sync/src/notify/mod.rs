//! Notification Dispatcher
//!
//! Converts a change event into zero or one notification, manages the
//! notification list, and triggers auxiliary side effects (toast, sound).
//!
//! Pure state-transition logic ([`plan_notification`]) is separated from
//! effectful dispatch ([`NotificationDispatcher`]) so the planner can be
//! unit-tested without mocking audio or UI. Side effects are best-effort:
//! a failure is logged, never propagated, and never blocks list mutation.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{Arc, Mutex};

use serde_json::json;
use shared::{
    ChangeEvent, ChangeKind, Notification, NotificationLevel, NotificationType, Order, Topic,
    WaiterRequest,
};

use crate::error::SideEffectError;

// ==================== Pure planner ====================

/// Derive at most one notification from a change event.
///
/// Update events only produce a notification when a tracked field changed:
/// a status transition yields an explicit "now <status>" message, any other
/// material change a generic update, and a no-op update (identical rows)
/// yields nothing. A generic update id carries a fingerprint of the new row,
/// so redelivery of one event dedupes while distinct updates each surface.
pub fn plan_notification(event: &ChangeEvent) -> Option<Notification> {
    match (event.topic, event.kind) {
        (Topic::Orders, ChangeKind::Insert) => {
            let order: Order = event.decode_new().ok()?;
            Some(
                Notification::new(
                    format!("order-{}", order.id),
                    NotificationType::Order,
                    "New Order",
                    format!("Table {} placed a new order", order.table_number),
                )
                .with_metadata(order_metadata(&order)),
            )
        }
        (Topic::Orders, ChangeKind::Update) => {
            let new: Order = event.decode_new().ok()?;
            let old: Order = event.decode_old().ok()?;
            if old.status != new.status {
                // Ready transitions ring the kitchen bell.
                let kind = if new.status == shared::OrderStatus::Ready {
                    NotificationType::Kitchen
                } else {
                    NotificationType::Order
                };
                Some(
                    Notification::new(
                        format!("order-status-{}-{}", new.id, new.status),
                        kind,
                        "Order Updated",
                        format!("Order for table {} is now {}", new.table_number, new.status),
                    )
                    .with_metadata(order_metadata(&new)),
                )
            } else if event.row_changed() {
                let fingerprint = event.new.as_ref().map(row_fingerprint).unwrap_or_default();
                Some(
                    Notification::new(
                        format!("order-updated-{}-{fingerprint:016x}", new.id),
                        NotificationType::Order,
                        "Order Updated",
                        format!("Order for table {} was updated", new.table_number),
                    )
                    .with_metadata(order_metadata(&new)),
                )
            } else {
                // No-op update: nothing meaningful changed, raise nothing.
                None
            }
        }
        (Topic::Orders, ChangeKind::Delete) => {
            let old: Order = event.decode_old().ok()?;
            Some(
                Notification::new(
                    format!("order-removed-{}", old.id),
                    NotificationType::Order,
                    "Order Removed",
                    format!("Order for table {} was removed", old.table_number),
                )
                .with_level(NotificationLevel::Warning)
                .with_metadata(order_metadata(&old)),
            )
        }
        (Topic::WaiterRequests, ChangeKind::Insert) => {
            let request: WaiterRequest = event.decode_new().ok()?;
            Some(
                Notification::new(
                    format!("waiter-{}", request.id),
                    NotificationType::WaiterRequest,
                    "Waiter Requested",
                    format!("Table {} requested a waiter", request.table_number),
                )
                .with_metadata(json!({
                    "request_id": request.id,
                    "table_number": request.table_number,
                })),
            )
        }
        // Waiter request updates/deletes are state bookkeeping, not alerts.
        (Topic::WaiterRequests, _) => None,
    }
}

fn order_metadata(order: &Order) -> serde_json::Value {
    json!({
        "order_id": order.id,
        "table_number": order.table_number,
    })
}

// Map values serialize with sorted keys, so equal rows hash equal.
fn row_fingerprint(row: &serde_json::Value) -> u64 {
    let mut hasher = DefaultHasher::new();
    row.to_string().hash(&mut hasher);
    hasher.finish()
}

// ==================== Notification list ====================

/// Ordered notification list, newest first, capped at most-recent-N.
///
/// The unread count is always derived from the list — there is no separate
/// counter that could drift.
#[derive(Debug)]
pub struct NotificationCenter {
    inner: Mutex<Vec<Notification>>,
    cap: usize,
}

impl NotificationCenter {
    pub fn new(cap: usize) -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
            cap: cap.max(1),
        }
    }

    /// Insert a notification at the front. Returns `false` when an entry
    /// with the same id already exists (idempotent insertion).
    pub fn push(&self, notification: Notification) -> bool {
        let mut list = self.inner.lock().unwrap();
        if list.iter().any(|n| n.id == notification.id) {
            return false;
        }
        list.insert(0, notification);
        list.truncate(self.cap);
        true
    }

    /// Live count of unread entries.
    pub fn unread_count(&self) -> usize {
        self.inner.lock().unwrap().iter().filter(|n| !n.read).count()
    }

    /// Mark one notification read; no-op when the id is unknown.
    pub fn mark_as_read(&self, id: &str) {
        let mut list = self.inner.lock().unwrap();
        if let Some(n) = list.iter_mut().find(|n| n.id == id) {
            n.read = true;
        }
    }

    pub fn mark_all_as_read(&self) {
        for n in self.inner.lock().unwrap().iter_mut() {
            n.read = true;
        }
    }

    /// Current list, newest first.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.inner.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ==================== Side effect sinks ====================

/// Sound cues an implementation may map to audio assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    NewOrder,
    KitchenReady,
    WaiterCall,
}

/// Audio playback seam. Playback failure (e.g. blocked by an autoplay
/// policy) is reported as an error value and swallowed by the dispatcher.
pub trait SoundPlayer: Send + Sync {
    fn play(&self, cue: SoundCue) -> Result<(), SideEffectError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

/// Transient UI alert, fire-and-forget.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub title: String,
    pub message: String,
    pub variant: ToastVariant,
    pub duration_ms: u64,
}

impl Toast {
    pub fn from_notification(notification: &Notification) -> Self {
        Self {
            title: notification.title.clone(),
            message: notification.message.clone(),
            variant: if notification.level >= NotificationLevel::Warning {
                ToastVariant::Destructive
            } else {
                ToastVariant::Default
            },
            duration_ms: 5_000,
        }
    }
}

/// Toast/UI alert seam.
pub trait ToastSink: Send + Sync {
    fn toast(&self, toast: Toast) -> Result<(), SideEffectError>;
}

// ==================== Effectful dispatcher ====================

/// Applies planned notifications to the center and fires side effects.
pub struct NotificationDispatcher {
    center: Arc<NotificationCenter>,
    sound: Option<Arc<dyn SoundPlayer>>,
    toast: Option<Arc<dyn ToastSink>>,
    sound_enabled: bool,
}

impl NotificationDispatcher {
    pub fn new(
        center: Arc<NotificationCenter>,
        sound: Option<Arc<dyn SoundPlayer>>,
        toast: Option<Arc<dyn ToastSink>>,
        sound_enabled: bool,
    ) -> Self {
        Self {
            center,
            sound,
            toast,
            sound_enabled,
        }
    }

    pub fn center(&self) -> &Arc<NotificationCenter> {
        &self.center
    }

    /// Process one change event in delivery order.
    ///
    /// Returns the raised notification, or `None` when the event planned
    /// nothing or was a duplicate of an already-seen notification id.
    pub fn dispatch(&self, event: &ChangeEvent) -> Option<Notification> {
        let notification = plan_notification(event)?;
        if !self.center.push(notification.clone()) {
            tracing::debug!(id = %notification.id, "duplicate notification suppressed");
            return None;
        }
        self.emit_side_effects(&notification);
        Some(notification)
    }

    fn emit_side_effects(&self, notification: &Notification) {
        if let Some(sink) = &self.toast
            && let Err(err) = sink.toast(Toast::from_notification(notification))
        {
            tracing::warn!(%err, id = %notification.id, "toast failed");
        }

        if self.sound_enabled
            && let Some(player) = &self.sound
        {
            let cue = match notification.kind {
                NotificationType::Kitchen => SoundCue::KitchenReady,
                NotificationType::WaiterRequest => SoundCue::WaiterCall,
                _ => SoundCue::NewOrder,
            };
            if let Err(err) = player.play(cue) {
                tracing::warn!(%err, id = %notification.id, "notification sound failed");
            }
        }
    }
}
