//! Command and action types.

use std::fmt;

use crate::keyboard::InlineKeyboard;
use crate::reports::ReportRequest;

/// Text commands the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    /// Show the main menu.
    Start,

    /// Same as start; the menu is the help.
    Help,
}

impl BotCommand {
    /// Parses a command from a message text.
    ///
    /// Accepts `/start` and `/start@botname`, case-insensitively.
    /// Returns `None` if the message is not a known command.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let first = text.trim().split_whitespace().next()?;
        let name = first.strip_prefix('/')?;
        let name = name.split_once('@').map_or(name, |(cmd, _bot)| cmd);

        match name.to_lowercase().as_str() {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            _ => None,
        }
    }

    /// Returns the command name as it appears in the chat.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
        }
    }
}

impl fmt::Display for BotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.name())
    }
}

/// Something the Telegram layer should do in response to an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotAction {
    /// Reply with the menu prompt and a keyboard.
    ReplyMenu(InlineKeyboard),

    /// Replace the keyboard of the message that was pressed.
    EditMenu(InlineKeyboard),

    /// Generate a report and send it as a document.
    SendReport(ReportRequest),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start() {
        assert_eq!(BotCommand::parse("/start"), Some(BotCommand::Start));
        assert_eq!(BotCommand::parse("  /START  "), Some(BotCommand::Start));
        assert_eq!(BotCommand::parse("/start@cashflow_bot"), Some(BotCommand::Start));
        assert_eq!(BotCommand::parse("/start payload"), Some(BotCommand::Start));
    }

    #[test]
    fn test_parse_help() {
        assert_eq!(BotCommand::parse("/help"), Some(BotCommand::Help));
    }

    #[test]
    fn test_parse_non_commands() {
        assert_eq!(BotCommand::parse("start"), None);
        assert_eq!(BotCommand::parse("/cashflow"), None);
        assert_eq!(BotCommand::parse(""), None);
        assert_eq!(BotCommand::parse("hello /start"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(BotCommand::Start.to_string(), "/start");
    }
}
