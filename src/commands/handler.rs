//! Decides what to do for commands and button presses.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use super::types::{BotAction, BotCommand};
use crate::dispatcher::{DialogState, DialogStore, UserId};
use crate::keyboard::{CalendarMode, CallbackAction, YearMonth, calendar, main_menu};
use crate::reports::ReportRequest;

/// Maps updates to [`BotAction`]s and keeps the per-user selection state.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    dialogs: Arc<DialogStore>,
}

impl CommandHandler {
    /// Creates a new command handler.
    #[must_use]
    pub fn new(dialogs: Arc<DialogStore>) -> Self {
        Self { dialogs }
    }

    /// Tries to parse a text command.
    ///
    /// Returns `None` if the message is not a command.
    pub fn try_handle_text(&self, message_text: &str) -> Option<Vec<BotAction>> {
        let command = BotCommand::parse(message_text)?;
        debug!("Handling command: {}", command);

        match command {
            BotCommand::Start | BotCommand::Help => {
                Some(vec![BotAction::ReplyMenu(main_menu())])
            }
        }
    }

    /// Handles a button press from `user`.
    pub async fn handle_callback(
        &self,
        user: UserId,
        action: CallbackAction,
        today: NaiveDate,
    ) -> Vec<BotAction> {
        debug!("Handling callback {:?} from user {}", action, user);

        match action {
            CallbackAction::Today => vec![
                BotAction::SendReport(ReportRequest::Day(today)),
                BotAction::EditMenu(main_menu()),
            ],
            CallbackAction::Day => vec![BotAction::EditMenu(calendar(
                YearMonth::of(today),
                CalendarMode::Day,
            ))],
            CallbackAction::Period => {
                self.dialogs.update(user, DialogState::begin_period).await;
                vec![BotAction::EditMenu(calendar(
                    YearMonth::of(today),
                    CalendarMode::PeriodFrom,
                ))]
            }
            CallbackAction::BackMain => vec![BotAction::EditMenu(main_menu())],
            CallbackAction::PrevMonth { month, mode } => {
                vec![BotAction::EditMenu(calendar(month.prev(), mode))]
            }
            CallbackAction::NextMonth { month, mode } => {
                vec![BotAction::EditMenu(calendar(month.next(), mode))]
            }
            CallbackAction::SetDay { day, mode } => self.handle_set_day(user, day, mode).await,
            CallbackAction::Noop | CallbackAction::Unknown => Vec::new(),
        }
    }

    async fn handle_set_day(
        &self,
        user: UserId,
        day: NaiveDate,
        mode: CalendarMode,
    ) -> Vec<BotAction> {
        match mode {
            CalendarMode::Day => vec![
                BotAction::SendReport(ReportRequest::Day(day)),
                BotAction::EditMenu(main_menu()),
            ],
            CalendarMode::PeriodFrom => {
                self.dialogs.update(user, |state| state.set_from(day)).await;
                vec![BotAction::EditMenu(calendar(
                    YearMonth::of(day),
                    CalendarMode::PeriodTo,
                ))]
            }
            CalendarMode::PeriodTo => {
                let period_from = self
                    .dialogs
                    .update(user, |state| {
                        let from = state.period_from;
                        state.reset();
                        from
                    })
                    .await;

                // Without a remembered start the choice is a single day
                let request = match period_from {
                    Some(from) => ReportRequest::Period { from, to: day },
                    None => ReportRequest::Day(day),
                };
                vec![
                    BotAction::SendReport(request),
                    BotAction::EditMenu(main_menu()),
                ]
            }
        }
    }

    /// Returns the dialog store.
    #[cfg(test)]
    pub fn dialogs(&self) -> &Arc<DialogStore> {
        &self.dialogs
    }
}
