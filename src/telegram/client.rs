//! Telegram bot client wrapper.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use grammers_client::client::{UpdateStream, UpdatesConfiguration};
use grammers_client::update::{CallbackQuery, Message, Update};
use grammers_client::{Client, InputMessage, InvocationError, SenderPool, button, reply_markup, sender};
use grammers_session::storages::SqliteSession;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::RetryPolicy;
use crate::config::{MENU_PROMPT, TelegramConfig};
use crate::dispatcher::{UpdateSource, UserId};
use crate::keyboard::InlineKeyboard;

/// Errors that can occur during Telegram operations.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Bot sign in failed: {0}")]
    SignInFailed(String),

    #[error("Flood wait required: {0} seconds")]
    FloodWait(u32),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API invocation error: {0}")]
    Invocation(String),

    #[error("Upload failed: {0}")]
    Upload(String),
}

impl TelegramError {
    /// Whether retrying the same call may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::FloodWait(_) | Self::Network(_))
    }

    fn from_upload(err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                Self::Upload(err.to_string())
            }
            _ => Self::Network(err.to_string()),
        }
    }
}

impl From<InvocationError> for TelegramError {
    fn from(err: InvocationError) -> Self {
        let err_str = err.to_string();

        if (err_str.contains("FLOOD_WAIT") || err_str.contains("flood"))
            && let Some(seconds) = extract_flood_wait_seconds(&err_str)
        {
            return Self::FloodWait(seconds);
        }

        match err {
            InvocationError::Rpc(_) => Self::Invocation(err_str),
            _ => Self::Network(err_str),
        }
    }
}

/// Extracts flood wait seconds from an error message.
fn extract_flood_wait_seconds(err_msg: &str) -> Option<u32> {
    let patterns = ["flood_wait_", "flood wait "];
    // ASCII lowering keeps byte offsets valid for `err_msg`
    let lowered = err_msg.to_ascii_lowercase();

    for pattern in patterns {
        if let Some(idx) = lowered.find(pattern) {
            let start = idx + pattern.len();
            let num_str: String = err_msg[start..]
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            if let Ok(seconds) = num_str.parse() {
                return Some(seconds);
            }
        }
    }
    None
}

/// High-level Telegram bot wrapper.
pub struct TelegramBot {
    /// The underlying grammers client.
    client: Client,

    /// Handle to the sender pool for disconnection.
    handle: sender::SenderPoolHandle,

    /// Retry policy for document uploads.
    retry: RetryPolicy,

    /// Background task running the sender pool.
    _pool_task: JoinHandle<()>,
}

impl TelegramBot {
    /// Connects to Telegram and signs in as a bot if the session is fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be opened or sign in fails.
    pub async fn connect(
        config: &TelegramConfig,
        retry: RetryPolicy,
    ) -> Result<(Self, UpdateFeed), TelegramError> {
        info!("Connecting to Telegram...");

        let session = Arc::new(
            SqliteSession::open(&config.session_path)
                .await
                .map_err(|e| TelegramError::Session(e.to_string()))?,
        );

        let SenderPool {
            runner,
            updates,
            handle,
        } = SenderPool::new(Arc::clone(&session), config.api_id);

        let client = Client::new(handle.clone());

        let pool_task = tokio::spawn(async move {
            runner.run().await;
        });

        let is_authorized = client
            .is_authorized()
            .await
            .map_err(|e| TelegramError::Connection(e.to_string()))?;

        if is_authorized {
            debug!("Reusing session at {}", config.session_path.display());
        } else {
            info!("Signing in as bot...");
            client
                .bot_sign_in(&config.bot_token, &config.api_hash)
                .await
                .map_err(|e| TelegramError::SignInFailed(e.to_string()))?;
        }
        info!("Connected to Telegram");

        let stream = client
            .stream_updates(
                updates,
                UpdatesConfiguration {
                    catch_up: false,
                    ..Default::default()
                },
            )
            .await;

        let bot = Self {
            client,
            handle: handle.thin,
            retry,
            _pool_task: pool_task,
        };
        Ok((bot, UpdateFeed { stream }))
    }

    /// Acknowledges a button press so the client stops its spinner.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn answer_callback(&self, query: &CallbackQuery) -> Result<(), TelegramError> {
        query.answer().send().await?;
        Ok(())
    }

    /// Loads the message whose keyboard was pressed.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be fetched.
    pub async fn callback_message(&self, query: &CallbackQuery) -> Result<Message, TelegramError> {
        Ok(query.load_message().await?)
    }

    /// Replies to `message` with the menu prompt and `keyboard`.
    ///
    /// # Errors
    ///
    /// Returns an error if sending fails.
    pub async fn reply_menu(
        &self,
        message: &Message,
        keyboard: &InlineKeyboard,
    ) -> Result<(), TelegramError> {
        message.reply(menu_message(keyboard)).await?;
        Ok(())
    }

    /// Replaces the prompt and keyboard of `message`.
    ///
    /// # Errors
    ///
    /// Returns an error if editing fails.
    pub async fn edit_menu(
        &self,
        message: &Message,
        keyboard: &InlineKeyboard,
    ) -> Result<(), TelegramError> {
        message.edit(menu_message(keyboard)).await?;
        Ok(())
    }

    /// Uploads `path` and sends it to the chat of `message`.
    ///
    /// Network errors and flood waits are retried according to the policy.
    ///
    /// # Errors
    ///
    /// Returns the last error once attempts run out.
    pub async fn send_document(
        &self,
        message: &Message,
        path: &Path,
        caption: &str,
    ) -> Result<(), TelegramError> {
        info!("Sending document {}", path.display());

        self.retry
            .run(|attempt| async move {
                if attempt > 0 {
                    debug!("Resending {} (attempt {})", path.display(), attempt + 1);
                }
                let uploaded = self
                    .client
                    .upload_file(path)
                    .await
                    .map_err(|e| TelegramError::from_upload(&e))?;
                message
                    .respond(InputMessage::new().text(caption).document(uploaded))
                    .await?;
                Ok(())
            })
            .await
    }

    /// Disconnects from Telegram.
    pub fn disconnect(&self) {
        info!("Disconnecting from Telegram...");
        self.handle.quit();
    }
}

impl std::fmt::Debug for TelegramBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramBot")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

/// User who pressed a button.
#[must_use]
pub fn callback_user(query: &CallbackQuery) -> UserId {
    query.sender().id()
}

fn menu_message(keyboard: &InlineKeyboard) -> InputMessage {
    InputMessage::new()
        .text(MENU_PROMPT)
        .reply_markup(&to_markup(keyboard))
}

fn to_markup(keyboard: &InlineKeyboard) -> reply_markup::Inline {
    reply_markup::inline(
        keyboard
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|b| button::inline(b.text.clone(), b.data.clone().into_bytes()))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>(),
    )
}

/// Live update stream of the bot.
pub struct UpdateFeed {
    stream: UpdateStream,
}

#[async_trait]
impl UpdateSource for UpdateFeed {
    type Update = Update;

    async fn next_update(&mut self) -> Result<Update, TelegramError> {
        Ok(self.stream.next().await?)
    }

    async fn finish(&mut self) {
        debug!("Saving update state");
        self.stream.sync_update_state().await;
    }
}

impl std::fmt::Debug for UpdateFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateFeed").finish_non_exhaustive()
    }
}

/// Truncates a string for logging purposes.
pub fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_owned()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

/// Logs and drops a failed edit; Telegram rejects edits that change nothing.
pub fn log_edit_failure(err: &TelegramError) {
    if err.to_string().contains("MESSAGE_NOT_MODIFIED") {
        debug!("Menu unchanged");
    } else {
        warn!("Failed to edit menu: {}", err);
    }
}
