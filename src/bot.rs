//! Glue between Telegram updates, command decisions and report delivery.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tracing::{debug, error, info, warn};

use crate::commands::{BotAction, CommandHandler};
use crate::dispatcher::{UpdateSink, UserId};
use crate::keyboard::{CallbackAction, InlineKeyboard};
use crate::reports::{ReportRequest, ReportService};
use crate::telegram::{
    CallbackQuery, Message, TelegramBot, TelegramError, Update, callback_user, log_edit_failure,
    truncate_for_log,
};

/// Chat operations the bot needs from Telegram.
#[async_trait]
pub trait ChatTransport: Send + Sync + 'static {
    /// Message the bot replies to or edits.
    type Chat: Send + Sync;

    /// Button press.
    type Callback: Send + Sync;

    fn callback_user(&self, query: &Self::Callback) -> UserId;

    fn callback_data(&self, query: &Self::Callback) -> String;

    async fn answer_callback(&self, query: &Self::Callback) -> Result<(), TelegramError>;

    /// Loads the message whose keyboard was pressed.
    async fn callback_chat(&self, query: &Self::Callback) -> Result<Self::Chat, TelegramError>;

    async fn reply_menu(
        &self,
        chat: &Self::Chat,
        keyboard: &InlineKeyboard,
    ) -> Result<(), TelegramError>;

    async fn edit_menu(
        &self,
        chat: &Self::Chat,
        keyboard: &InlineKeyboard,
    ) -> Result<(), TelegramError>;

    async fn send_document(
        &self,
        chat: &Self::Chat,
        path: &Path,
        caption: &str,
    ) -> Result<(), TelegramError>;
}

#[async_trait]
impl ChatTransport for TelegramBot {
    type Chat = Message;
    type Callback = CallbackQuery;

    fn callback_user(&self, query: &CallbackQuery) -> UserId {
        callback_user(query)
    }

    fn callback_data(&self, query: &CallbackQuery) -> String {
        String::from_utf8_lossy(query.data()).into_owned()
    }

    async fn answer_callback(&self, query: &CallbackQuery) -> Result<(), TelegramError> {
        TelegramBot::answer_callback(self, query).await
    }

    async fn callback_chat(&self, query: &CallbackQuery) -> Result<Message, TelegramError> {
        self.callback_message(query).await
    }

    async fn reply_menu(
        &self,
        chat: &Message,
        keyboard: &InlineKeyboard,
    ) -> Result<(), TelegramError> {
        TelegramBot::reply_menu(self, chat, keyboard).await
    }

    async fn edit_menu(
        &self,
        chat: &Message,
        keyboard: &InlineKeyboard,
    ) -> Result<(), TelegramError> {
        TelegramBot::edit_menu(self, chat, keyboard).await
    }

    async fn send_document(
        &self,
        chat: &Message,
        path: &Path,
        caption: &str,
    ) -> Result<(), TelegramError> {
        TelegramBot::send_document(self, chat, path, caption).await
    }
}

/// Handles bot updates.
pub struct BotApp<T: ChatTransport = TelegramBot> {
    transport: Arc<T>,
    commands: CommandHandler,
    reports: ReportService,
    keep_reports: bool,
}

impl<T: ChatTransport> BotApp<T> {
    #[must_use]
    pub fn new(
        transport: Arc<T>,
        commands: CommandHandler,
        reports: ReportService,
        keep_reports: bool,
    ) -> Self {
        Self {
            transport,
            commands,
            reports,
            keep_reports,
        }
    }

    /// Handles an incoming text message.
    pub async fn on_text(&self, chat: &T::Chat, text: &str) {
        let Some(actions) = self.commands.try_handle_text(text) else {
            debug!("Ignoring message: \"{}\"", truncate_for_log(text, 30));
            return;
        };
        self.execute(chat, actions).await;
    }

    /// Handles a button press. The press is always answered first.
    pub async fn on_callback(&self, query: &T::Callback) {
        let user = self.transport.callback_user(query);
        let data = self.transport.callback_data(query);
        debug!("Callback \"{}\" from user {}", truncate_for_log(&data, 40), user);

        // Stops the client spinner while the report builds
        if let Err(e) = self.transport.answer_callback(query).await {
            warn!("Failed to answer callback: {}", e);
        }

        let action = CallbackAction::parse(&data, today());
        if matches!(action, CallbackAction::Noop | CallbackAction::Unknown) {
            return;
        }

        let chat = match self.transport.callback_chat(query).await {
            Ok(chat) => chat,
            Err(e) => {
                error!("Failed to load pressed message: {}", e);
                return;
            }
        };

        let actions = self.commands.handle_callback(user, action, today()).await;
        self.execute(&chat, actions).await;
    }

    async fn execute(&self, chat: &T::Chat, actions: Vec<BotAction>) {
        for action in actions {
            match action {
                BotAction::ReplyMenu(keyboard) => {
                    if let Err(e) = self.transport.reply_menu(chat, &keyboard).await {
                        error!("Failed to send menu: {}", e);
                    }
                }
                BotAction::EditMenu(keyboard) => {
                    if let Err(e) = self.transport.edit_menu(chat, &keyboard).await {
                        log_edit_failure(&e);
                    }
                }
                BotAction::SendReport(request) => self.send_report(chat, &request).await,
            }
        }
    }

    async fn send_report(&self, chat: &T::Chat, request: &ReportRequest) {
        info!("Generating report: {}", request.caption());

        let report = match self.reports.generate(request).await {
            Ok(report) => report,
            Err(e) => {
                error!("Report generation failed: {}", e);
                return;
            }
        };

        match self
            .transport
            .send_document(chat, &report.path, &report.caption)
            .await
        {
            Ok(()) => info!("Report sent: {}", report.caption),
            Err(e) => error!("Failed to send report {}: {}", report.path.display(), e),
        }

        if !self.keep_reports
            && let Err(e) = report.remove().await
        {
            warn!("Failed to remove {}: {}", report.dir().display(), e);
        }
    }
}

impl<T: ChatTransport> std::fmt::Debug for BotApp<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotApp")
            .field("reports", &self.reports)
            .field("keep_reports", &self.keep_reports)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl UpdateSink for BotApp<TelegramBot> {
    type Update = Update;

    async fn handle(&self, update: Update) {
        match update {
            Update::NewMessage(message) if !message.outgoing() => {
                let text = message.text().to_owned();
                self.on_text(&message, &text).await;
            }
            Update::CallbackQuery(query) => self.on_callback(&query).await,
            _ => {}
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
