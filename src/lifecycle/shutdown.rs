//! Shutdown coordination for the asset manager.

use std::time::Duration;

use tokio::sync::broadcast;

use crate::resilience::Deadline;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that the HTTP server and every in-flight
/// orchestration run subscribe to.
#[derive(Clone)]
pub struct Shutdown {
    /// Broadcast channel sender.
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

    /// A deadline `timeout` from now that is also cancelled by shutdown.
    pub fn deadline(&self, timeout: Duration) -> Deadline {
        Deadline::after(timeout).with_cancel(self.subscribe())
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let notified = self.tx.send(()).unwrap_or(0);
        tracing::info!(subscribers = notified, "Shutdown triggered");
    }

    /// Resolve once shutdown has been triggered.
    pub async fn wait(mut rx: broadcast::Receiver<()>) {
        let _ = rx.recv().await;
    }

    /// Get the number of active subscribers (runs still waiting).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
