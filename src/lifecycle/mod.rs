//! Process lifecycle module.
//!
//! The binary is the container's main process: it runs one entry routine
//! that is never expected to return, stops within a bounded grace period on
//! SIGTERM/SIGINT, and maps the outcome to an exit code.

mod shutdown;
mod signals;
mod state;
mod supervisor;

pub use shutdown::{ShutdownHandle, ShutdownSignal, shutdown_channel};
pub use signals::{TerminationListener, wait_for_termination};
pub use state::{
    EXIT_CLEAN, EXIT_FAILURE, ExitReason, LifecycleError, ProcessState, TerminationSignal,
};
pub use supervisor::Supervisor;
