//! Inline keyboard module.
//!
//! Builds the main menu and month calendars, and parses the
//! callback data their buttons carry.

mod callback;
mod menus;

pub use callback::{CalendarMode, CallbackAction, YearMonth};
pub use menus::{InlineButton, InlineKeyboard, calendar, main_menu};
