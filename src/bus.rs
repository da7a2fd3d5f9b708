//! Broadcast channel for SDK lifecycle events.

use tokio::sync::broadcast;

/// Events emitted by the SDK over its lifetime.
///
/// Delivery is at-least-once under rapid repeated triggers; subscribers must
/// be idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdkEvent {
    /// Initialization finished and a consent status is available.
    Ready,
    /// A dialog session wrote consent data and completed.
    ConsentUpdated,
}

#[derive(Clone)]
pub struct Bus {
    sender: broadcast::Sender<SdkEvent>,
}

impl Bus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SdkEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event. Having no subscribers is not an error.
    pub fn publish(&self, event: SdkEvent) {
        let _ = self.sender.send(event);
    }
}
