//! Lifecycle coordination.
//!
//! The session's event pump is a long-running task; `Shutdown` gives its
//! owner a way to stop it (and any other subscriber) with one signal.

use tokio::sync::broadcast;

/// Coordinator for stopping long-running session tasks.
///
/// Provides a broadcast channel the event pump subscribes to. Dropping the
/// coordinator without triggering also ends subscribers' channels, which
/// the pump treats as a stop signal.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal for all subscribers.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Number of tasks still subscribed.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
