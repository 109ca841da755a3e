//! In-process stop notification for the entry routine.

use std::sync::Arc;

use tokio::sync::watch;

/// Creates a connected handle/signal pair.
#[must_use]
pub fn shutdown_channel() -> (ShutdownHandle, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownHandle { tx: Arc::new(tx) }, ShutdownSignal { rx })
}

/// Triggers shutdown. Cloneable; triggering twice is a no-op.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Resolves once shutdown was triggered or every handle was dropped.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Waits for shutdown. Cancel-safe.
    pub async fn wait(&mut self) {
        // Err means all handles are gone; nobody can trigger any more
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }
}
