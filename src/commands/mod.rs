//! Command handling module.
//!
//! Turns `/start` messages and inline button presses into
//! actions for the Telegram layer.

mod handler;
mod types;

pub use handler::CommandHandler;
pub use types::{BotAction, BotCommand};
