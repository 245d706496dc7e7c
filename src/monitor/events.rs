//! Observable monitor events.

use std::path::PathBuf;
use tokio::sync::broadcast;

/// Buffered events per subscriber before the oldest are dropped.
const EVENT_CAPACITY: usize = 64;

/// Notification emitted by the consistency monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEvent {
    /// The settings became inconsistent.
    Error,
    /// The settings became consistent again.
    ErrorResolved,
    /// The backing file changed on disk, whatever the outcome.
    FileChanged(PathBuf),
}

/// Fan-out of [`ConfigEvent`]s to every subscriber.
///
/// Sends never block; with no subscribers an event is dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ConfigEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConfigEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: ConfigEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
