//! Termination signal listening.

use tracing::debug;

use super::state::TerminationSignal;

/// Installed signal handlers.
///
/// Install before the entry routine starts so that a signal arriving during
/// startup is not lost.
#[derive(Debug)]
pub struct TerminationListener {
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
}

impl TerminationListener {
    /// Registers SIGTERM and SIGINT handlers.
    #[cfg(unix)]
    pub fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        debug!("Installing SIGTERM/SIGINT handlers");
        Ok(Self {
            terminate: signal(SignalKind::terminate())?,
            interrupt: signal(SignalKind::interrupt())?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> std::io::Result<Self> {
        debug!("Installing Ctrl+C handler");
        Ok(Self {})
    }

    /// Waits for the first termination signal.
    #[cfg(unix)]
    pub async fn recv(mut self) -> TerminationSignal {
        tokio::select! {
            _ = self.terminate.recv() => TerminationSignal::Terminate,
            _ = self.interrupt.recv() => TerminationSignal::Interrupt,
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(self) -> TerminationSignal {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        TerminationSignal::Interrupt
    }
}

/// Installs the handlers and waits for the first signal.
pub async fn wait_for_termination() -> std::io::Result<TerminationSignal> {
    Ok(TerminationListener::install()?.recv().await)
}
