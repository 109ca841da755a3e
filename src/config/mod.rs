//! Configuration module for the cashflow bot.
//!
//! Handles loading of Telegram credentials, iiko server settings
//! and runtime tuning from the environment.

mod settings;

pub use settings::{BotSettings, ConfigError, IikoConfig, LogFormat, TelegramConfig};

/// Prompt shown above the main menu.
pub const MENU_PROMPT: &str = "Выберите режим получения отчёта:";
