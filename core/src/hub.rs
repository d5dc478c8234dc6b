//! Fan-out of batch events to progress subscribers, backed by a
//! `tokio::sync::broadcast` channel.
//!
//! The hub is a live feed: subscribers that attach mid-batch only see events
//! from their attachment point onward, and a dropped or slow subscriber never
//! blocks the runner or the other subscribers.

use tokio::sync::{broadcast, mpsc};

use crate::events::BatchEvent;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

pub struct ProgressHub {
    sender: broadcast::Sender<BatchEvent>,
}

impl ProgressHub {
    /// Create a hub with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed events are dropped and
    /// the lagging receiver observes a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Deliver an event to all current subscribers.
    ///
    /// With zero subscribers the event is silently dropped; the batch runs to
    /// completion whether or not anyone is watching.
    pub fn publish(&self, event: BatchEvent) {
        // SendError only means there are no receivers right now.
        let _ = self.sender.send(event);
    }

    /// Attach a new subscriber, receiving events from this point onward.
    pub fn subscribe(&self) -> broadcast::Receiver<BatchEvent> {
        self.sender.subscribe()
    }

    /// Drain a runner's event stream into the hub until it closes.
    pub async fn forward(&self, mut events: mpsc::Receiver<BatchEvent>) {
        while let Some(event) = events.recv().await {
            self.publish(event);
        }
    }
}

impl Default for ProgressHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
