//! Update dispatching module.
//!
//! Runs the update loop and keeps the per-user dialog state that
//! the period selection needs.

mod runner;
mod state;

pub use runner::{Dispatcher, UpdateSink, UpdateSource};
pub use state::{DialogState, DialogStore, PeriodStage, UserId};
