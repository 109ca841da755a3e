//! Telegram client wrapper module.
//!
//! Bot sign-in, the update stream, menu messages and document uploads
//! with retries.

mod client;
mod retry;

pub use client::{
    TelegramBot, TelegramError, UpdateFeed, callback_user, log_edit_failure, truncate_for_log,
};
pub use grammers_client::update::{CallbackQuery, Message, Update};
pub use retry::RetryPolicy;
