//! Event bus for platform state changes
//!
//! Consumers (dashboards, trackers) subscribe to be told when the state
//! they render has changed.

use tokio::sync::broadcast;

use crate::report::PlatformEvent;

/// Broadcast channel of platform events
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event; having no subscribers is not an error
    pub fn publish(&self, event: PlatformEvent) {
        let report_id = event.report_id().map(str::to_string);
        if self.tx.send(event).is_err() {
            tracing::debug!(report_id = ?report_id, "Platform event dropped, no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
