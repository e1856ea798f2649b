//! Session events and user-visible notices.
//!
//! The auth layer and the HTTP client never talk to the screen directly.
//! They publish events on the [`EventBus`]; the presentation layer
//! subscribes and turns them into toasts and redirects.

pub mod notice;
pub mod session;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

pub use notice::Notice;
pub use session::{LogoutReason, SessionEvent};

/// Default number of events buffered per subscriber.
const DEFAULT_CAPACITY: usize = 64;

/// Wrapper for all console events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all console event types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A session lifecycle change.
    Session(SessionEvent),
    /// A message meant for the user.
    Notice(Notice),
}

impl ConsoleEvent {
    /// Create a new console event.
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Broadcast bus shared by the session manager, the HTTP client, and the UI.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ConsoleEvent>,
}

impl EventBus {
    /// Create a bus with the default buffer size.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus buffering `capacity` events per subscriber.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.sender.subscribe()
    }

    /// Publish a session event.
    pub fn session(&self, event: SessionEvent) {
        self.publish(EventPayload::Session(event));
    }

    /// Publish a user-visible notice.
    pub fn notice(&self, notice: Notice) {
        self.publish(EventPayload::Notice(notice));
    }

    fn publish(&self, payload: EventPayload) {
        // No subscribers is fine: nobody is looking at the screen.
        if self.sender.send(ConsoleEvent::new(payload)).is_err() {
            debug!("Event published with no subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
