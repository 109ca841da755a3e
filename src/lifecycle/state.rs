//! Process state machine and exit reasons.

use std::fmt;

use thiserror::Error;

/// Exit code for a clean termination.
pub const EXIT_CLEAN: u8 = 0;

/// Exit code for every abnormal termination.
pub const EXIT_FAILURE: u8 = 1;

/// Signal that asked the process to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    /// SIGTERM, sent by the container runtime on stop.
    Terminate,
    /// SIGINT or Ctrl+C.
    Interrupt,
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminate => f.write_str("SIGTERM"),
            Self::Interrupt => f.write_str("SIGINT"),
        }
    }
}

/// Why the process instance ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// Stopped by a signal and the entry routine finished in time.
    Signal(TerminationSignal),
    /// Stopped by a signal but the entry routine had to be aborted.
    GraceExpired(TerminationSignal),
    /// The entry routine returned although it should run forever.
    UnexpectedReturn,
    /// The entry routine returned an error.
    Fault(String),
    /// The entry routine panicked.
    Panicked(String),
}

impl ExitReason {
    /// Process exit code: `0` only for a clean signal-driven stop.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Signal(_) => EXIT_CLEAN,
            Self::GraceExpired(_) | Self::UnexpectedReturn | Self::Fault(_) | Self::Panicked(_) => {
                EXIT_FAILURE
            }
        }
    }

    #[must_use]
    pub const fn is_clean(&self) -> bool {
        matches!(self, Self::Signal(_))
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signal(sig) => write!(f, "terminated by {sig}"),
            Self::GraceExpired(sig) => write!(f, "aborted after {sig}: grace period expired"),
            Self::UnexpectedReturn => f.write_str("entry routine returned unexpectedly"),
            Self::Fault(msg) => write!(f, "entry routine failed: {msg}"),
            Self::Panicked(msg) => write!(f, "entry routine panicked: {msg}"),
        }
    }
}

/// Invalid lifecycle transition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Process already started")]
    AlreadyStarted,

    #[error("Process is not running")]
    NotRunning,
}

/// `NotStarted → Running → Exited`; `Exited` is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProcessState {
    #[default]
    NotStarted,
    Running,
    Exited(ExitReason),
}

impl ProcessState {
    /// Moves from `NotStarted` to `Running`.
    pub fn start(&mut self) -> Result<(), LifecycleError> {
        match self {
            Self::NotStarted => {
                *self = Self::Running;
                Ok(())
            }
            _ => Err(LifecycleError::AlreadyStarted),
        }
    }

    /// Moves from `Running` to `Exited`.
    pub fn exit(&mut self, reason: ExitReason) -> Result<(), LifecycleError> {
        match self {
            Self::Running => {
                *self = Self::Exited(reason);
                Ok(())
            }
            _ => Err(LifecycleError::NotRunning),
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    #[must_use]
    pub const fn exit_reason(&self) -> Option<&ExitReason> {
        match self {
            Self::Exited(reason) => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_transitions() {
        let mut state = ProcessState::default();
        assert_eq!(state, ProcessState::NotStarted);

        state.start().unwrap();
        assert!(state.is_running());

        state
            .exit(ExitReason::Signal(TerminationSignal::Terminate))
            .unwrap();
        assert_eq!(
            state.exit_reason(),
            Some(&ExitReason::Signal(TerminationSignal::Terminate))
        );
    }

    #[test]
    fn test_exited_is_terminal() {
        let mut state = ProcessState::default();
        state.start().unwrap();
        state.exit(ExitReason::UnexpectedReturn).unwrap();

        assert_eq!(state.start(), Err(LifecycleError::AlreadyStarted));
        assert_eq!(
            state.exit(ExitReason::UnexpectedReturn),
            Err(LifecycleError::NotRunning)
        );
    }

    #[test]
    fn test_exit_before_start_rejected() {
        let mut state = ProcessState::default();
        assert_eq!(
            state.exit(ExitReason::UnexpectedReturn),
            Err(LifecycleError::NotRunning)
        );
        assert_eq!(state, ProcessState::NotStarted);
    }

    #[test]
    fn test_double_start_rejected() {
        let mut state = ProcessState::default();
        state.start().unwrap();
        assert_eq!(state.start(), Err(LifecycleError::AlreadyStarted));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitReason::Signal(TerminationSignal::Interrupt).exit_code(), 0);
        assert_eq!(ExitReason::GraceExpired(TerminationSignal::Terminate).exit_code(), 1);
        assert_eq!(ExitReason::UnexpectedReturn.exit_code(), 1);
        assert_eq!(ExitReason::Fault("boom".to_owned()).exit_code(), 1);
        assert_eq!(ExitReason::Panicked("boom".to_owned()).exit_code(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ExitReason::Signal(TerminationSignal::Terminate).to_string(),
            "terminated by SIGTERM"
        );
    }
}
