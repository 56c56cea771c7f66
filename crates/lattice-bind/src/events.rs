//! Lifecycle notifications for surrounding page logic.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Notifications emitted by a render controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderEvent {
    /// A render pass finished
    Rendered {
        /// Number of instances attached
        count: usize,
    },

    /// Remote acquisition started
    Loading {
        /// Locator being fetched
        src: String,
    },

    /// Acquisition or inline data failed
    Errored {
        /// Failure description
        message: String,
    },
}

/// Hub broadcasting render events to every subscriber.
#[derive(Debug, Clone)]
pub struct RenderHub {
    sender: broadcast::Sender<RenderEvent>,
}

impl RenderHub {
    /// Create a new hub.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send an event to all subscribers.
    pub fn send(&self, event: RenderEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    /// Subscribe to render events.
    pub fn subscribe(&self) -> broadcast::Receiver<RenderEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for RenderHub {
    fn default() -> Self {
        Self::new()
    }
}
