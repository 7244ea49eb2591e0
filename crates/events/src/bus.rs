//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] fans every [`LedgerEvent`] out to all subscribed front-ends.
//! It is designed to be shared via `Arc<EventBus>`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use wishtrack_core::{Notification, PoolKind, PoolView, UserId};

// ---------------------------------------------------------------------------
// LedgerEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEventKind {
    /// Published after every completed mutating operation, once the save
    /// has been attempted.
    StateChanged { pool: PoolKind, view: PoolView },

    /// Ephemeral message such as a 50/50 outcome or a failed save.
    Notification { message: String, duration_ms: u64 },
}

/// Something that happened to one user's ledger.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEvent {
    pub user: UserId,
    pub kind: LedgerEventKind,
    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl LedgerEvent {
    pub fn new(user: UserId, kind: LedgerEventKind) -> Self {
        Self {
            user,
            kind,
            timestamp: Utc::now(),
        }
    }

    pub fn state_changed(user: UserId, view: PoolView) -> Self {
        Self::new(
            user,
            LedgerEventKind::StateChanged {
                pool: view.pool,
                view,
            },
        )
    }

    pub fn notification(user: UserId, notification: Notification) -> Self {
        Self::new(
            user,
            LedgerEventKind::Notification {
                message: notification.message,
                duration_ms: notification.duration_ms,
            },
        )
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use wishtrack_core::{Notification, UserId};
/// use wishtrack_events::{EventBus, LedgerEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(LedgerEvent::notification(
///     UserId::default(),
///     Notification::tie_break(true),
/// ));
/// assert!(rx.try_recv().is_ok());
/// ```
pub struct EventBus {
    sender: broadcast::Sender<LedgerEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unread events are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: LedgerEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("Ledger event dropped, no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
