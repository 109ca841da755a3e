//! Runs the entry routine and turns its outcome into an exit reason.
//!
//! The routine runs as a spawned task. Three things can end it:
//! 1. it returns `Ok` → `UnexpectedReturn`
//! 2. it returns `Err` or panics → `Fault` / `Panicked`
//! 3. a termination signal arrives → shutdown is triggered and the routine
//!    gets `grace` to finish, after which it is aborted

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinError;
use tracing::{error, info, warn};

use super::shutdown::{ShutdownSignal, shutdown_channel};
use super::state::{ExitReason, ProcessState, TerminationSignal};

/// Supervises a single entry routine.
#[derive(Debug)]
pub struct Supervisor {
    grace: Duration,
    state: ProcessState,
}

impl Supervisor {
    /// Creates a supervisor with the given shutdown grace period.
    #[must_use]
    pub fn new(grace: Duration) -> Self {
        Self {
            grace,
            state: ProcessState::default(),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> &ProcessState {
        &self.state
    }

    /// Runs `entry` until it ends or `termination` resolves.
    ///
    /// `entry` receives a [`ShutdownSignal`] that fires on termination.
    pub async fn run<F, Fut, T>(&mut self, entry: F, termination: T) -> ExitReason
    where
        F: FnOnce(ShutdownSignal) -> Fut,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
        T: Future<Output = TerminationSignal>,
    {
        if let Err(e) = self.state.start() {
            error!("Cannot start entry routine: {}", e);
            return ExitReason::Fault(e.to_string());
        }

        let (handle, signal) = shutdown_channel();
        let mut task = tokio::spawn(entry(signal));
        info!("Entry routine running");

        let reason = tokio::select! {
            result = &mut task => outcome(result),
            sig = termination => {
                info!("Received {}, shutting down (grace {:?})", sig, self.grace);
                handle.trigger();

                match tokio::time::timeout(self.grace, &mut task).await {
                    Ok(Ok(Ok(()))) => ExitReason::Signal(sig),
                    Ok(result) => outcome(result),
                    Err(_) => {
                        warn!("Entry routine did not stop within {:?}, aborting", self.grace);
                        task.abort();
                        ExitReason::GraceExpired(sig)
                    }
                }
            }
        };

        if reason.is_clean() {
            info!("Process exiting: {}", reason);
        } else {
            error!("Process exiting: {}", reason);
        }

        // Running → Exited cannot fail here: start() succeeded above
        let _ = self.state.exit(reason.clone());
        reason
    }
}

fn outcome(result: Result<anyhow::Result<()>, JoinError>) -> ExitReason {
    match result {
        Ok(Ok(())) => ExitReason::UnexpectedReturn,
        Ok(Err(e)) => ExitReason::Fault(format!("{e:#}")),
        Err(e) if e.is_panic() => ExitReason::Panicked(panic_message(e)),
        Err(e) => ExitReason::Fault(e.to_string()),
    }
}

fn panic_message(err: JoinError) -> String {
    let payload = err.into_panic();
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned())
}
