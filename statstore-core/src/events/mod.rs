//! Event bus connecting the host's aggregation cycle to the sink backend.
//!
//! The host publishes one `Flush` per aggregation interval and `Status` on
//! demand; the backend drains them from a broadcast subscription. Publishing
//! never blocks and never fails.

use crate::snapshot::MetricsSnapshot;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::{broadcast, mpsc};
use tracing::debug;

/// Maximum number of events buffered in the broadcast channel.
const EVENT_BUFFER_SIZE: usize = 64;

/// Current unix timestamp in seconds.
pub fn unix_now() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64
}

/// One diagnostic line reported by the status operation.
///
/// Mirrors the host's `write(error, category, key, value)` callback; `error`
/// is always `None` in the current contract.
#[derive(Debug, Clone)]
pub struct StatusEntry {
    pub error: Option<String>,
    pub category: &'static str,
    pub key: &'static str,
    pub value: i64,
}

/// Events the host delivers to the sink.
#[derive(Debug, Clone)]
pub enum SinkEvent {
    /// Periodic flush: persist this interval's snapshot if it qualifies.
    Flush { timestamp: i64, snapshot: Arc<MetricsSnapshot> },

    /// On-demand status request; entries are sent back on `reply`.
    Status { reply: mpsc::UnboundedSender<StatusEntry> },
}

/// Event bus for publishing and subscribing to sink events.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SinkEvent>,
}

impl EventBus {
    /// Create a new event bus.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: SinkEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(event);
    }

    /// Subscribe to all sink events.
    pub fn subscribe(&self) -> EventSubscriber {
        EventSubscriber { receiver: self.sender.subscribe() }
    }

    /// Get the number of current subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscription handle draining sink events.
pub struct EventSubscriber {
    receiver: broadcast::Receiver<SinkEvent>,
}

impl EventSubscriber {
    /// Receive the next event. Returns `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<SinkEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    debug!("event subscriber lagged by {} events", n);
                    // Continue receiving
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
