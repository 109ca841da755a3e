//! Application settings, Telegram and iiko configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Telegram bot configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token issued by `@BotFather`.
    pub bot_token: String,

    /// Telegram API ID (obtain from <https://my.telegram.org>).
    pub api_id: i32,

    /// Telegram API hash (obtain from <https://my.telegram.org>).
    pub api_hash: String,

    /// Path to the session file.
    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,
}

fn default_session_path() -> PathBuf {
    PathBuf::from("session.db")
}

impl TelegramConfig {
    /// Creates a new Telegram configuration.
    #[must_use]
    pub fn new(bot_token: String, api_id: i32, api_hash: String) -> Self {
        Self {
            bot_token,
            api_id,
            api_hash,
            session_path: default_session_path(),
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Expects `TELEGRAM_BOT_TOKEN`, `TG_API_ID` and `TG_API_HASH` to be set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = required_var("TELEGRAM_BOT_TOKEN")?;

        let api_id: i32 = required_var("TG_API_ID")?
            .parse()
            .ok()
            .filter(|id| *id > 0)
            .ok_or(ConfigError::InvalidApiId)?;

        let api_hash = required_var("TG_API_HASH")?;

        let session_path = std::env::var("TG_SESSION_PATH")
            .map_or_else(|_| default_session_path(), PathBuf::from);

        Ok(Self {
            bot_token,
            api_id,
            api_hash,
            session_path,
        })
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_id", &self.api_id)
            .field("session_path", &self.session_path)
            .finish_non_exhaustive()
    }
}

/// Connection settings for the iiko server.
#[derive(Clone, Serialize, Deserialize)]
pub struct IikoConfig {
    /// Server base URL, without the trailing slash.
    pub base_url: String,

    pub login: String,

    pub password: String,

    /// OLAP preset to build reports from. `None` falls back to the
    /// TRANSACTIONS report.
    #[serde(default)]
    pub olap_preset_id: Option<String>,

    /// Timeout for the token request.
    #[serde(default = "default_auth_timeout")]
    pub auth_timeout: Duration,

    /// Timeout for report requests.
    #[serde(default = "default_report_timeout")]
    pub report_timeout: Duration,
}

fn default_auth_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_report_timeout() -> Duration {
    Duration::from_secs(60)
}

impl IikoConfig {
    /// Creates a configuration with default timeouts and no preset.
    #[must_use]
    pub fn new(base_url: &str, login: String, password: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            login,
            password,
            olap_preset_id: None,
            auth_timeout: default_auth_timeout(),
            report_timeout: default_report_timeout(),
        }
    }

    /// Sets the OLAP preset.
    #[must_use]
    pub fn with_preset(mut self, preset_id: impl Into<String>) -> Self {
        self.olap_preset_id = Some(preset_id.into());
        self
    }

    /// Reads `IIKO_BASE_URL`, `IIKO_LOGIN`, `IIKO_PASSWORD` and the optional
    /// `IIKO_OLAP_PRESET_ID`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = required_var("IIKO_BASE_URL")?;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                name: "IIKO_BASE_URL",
                reason: "must start with http:// or https://".to_owned(),
            });
        }

        let mut config = Self::new(
            &base_url,
            required_var("IIKO_LOGIN")?,
            required_var("IIKO_PASSWORD")?,
        );

        config.olap_preset_id = std::env::var("IIKO_OLAP_PRESET_ID")
            .ok()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());

        Ok(config)
    }
}

impl std::fmt::Debug for IikoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IikoConfig")
            .field("base_url", &self.base_url)
            .field("login", &self.login)
            .field("olap_preset_id", &self.olap_preset_id)
            .finish_non_exhaustive()
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Parses a format name; anything other than `json` is plain text.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }

    /// Reads `LOG_FORMAT`.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var("LOG_FORMAT").map_or_else(|_| Self::default(), |v| Self::parse(&v))
    }
}

/// Bot-specific settings.
#[derive(Debug, Clone)]
pub struct BotSettings {
    /// Directory the generated spreadsheets are written to.
    pub report_output_dir: PathBuf,

    /// Keep spreadsheets on disk after they were sent.
    pub keep_reports: bool,

    /// Extra attempts for a document upload.
    pub send_retries: u32,

    /// Base delay between upload attempts in milliseconds.
    pub send_retry_delay_ms: u64,

    /// Upper bound on shutdown after a termination signal, in seconds.
    pub shutdown_grace_secs: u64,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_send_retries() -> u32 {
    2
}

fn default_send_retry_delay_ms() -> u64 {
    2000
}

fn default_shutdown_grace_secs() -> u64 {
    10
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            report_output_dir: default_output_dir(),
            keep_reports: false,
            send_retries: default_send_retries(),
            send_retry_delay_ms: default_send_retry_delay_ms(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
        }
    }
}

impl BotSettings {
    /// Creates bot settings from environment variables with defaults.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        Self {
            report_output_dir: std::env::var("REPORT_OUTPUT_DIR")
                .map_or_else(|_| default_output_dir(), PathBuf::from),
            keep_reports: std::env::var("KEEP_REPORTS")
                .ok()
                .is_some_and(|v| parse_flag(&v)),
            send_retries: parsed_var("SEND_RETRIES").unwrap_or_else(default_send_retries),
            send_retry_delay_ms: parsed_var("SEND_RETRY_DELAY_MS")
                .unwrap_or_else(default_send_retry_delay_ms),
            shutdown_grace_secs: parsed_var("SHUTDOWN_GRACE_SECS")
                .unwrap_or_else(default_shutdown_grace_secs),
        }
    }

    /// Base delay between upload attempts.
    #[must_use]
    pub const fn send_retry_delay(&self) -> Duration {
        Duration::from_millis(self.send_retry_delay_ms)
    }

    /// Grace period granted to the entry routine on termination.
    #[must_use]
    pub const fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(name)),
    }
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid API ID format (must be a positive integer)")]
    InvalidApiId,

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = BotSettings::default();
        assert_eq!(settings.send_retries, 2);
        assert_eq!(settings.send_retry_delay(), Duration::from_secs(2));
        assert_eq!(settings.shutdown_grace(), Duration::from_secs(10));
        assert!(!settings.keep_reports);
    }

    #[test]
    fn test_telegram_config_new() {
        let config = TelegramConfig::new("123:abc".to_owned(), 12345, "abc123".to_owned());
        assert_eq!(config.api_id, 12345);
        assert_eq!(config.api_hash, "abc123");
        assert_eq!(config.session_path, PathBuf::from("session.db"));
    }

    #[test]
    fn test_telegram_config_debug_hides_secrets() {
        let config = TelegramConfig::new("123:secret".to_owned(), 1, "hash".to_owned());
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(!debug.contains("hash\""));
    }

    #[test]
    fn test_iiko_config_trims_trailing_slash() {
        let config = IikoConfig::new("https://iiko.example/", "u".to_owned(), "p".to_owned());
        assert_eq!(config.base_url, "https://iiko.example");
        assert!(config.olap_preset_id.is_none());
        assert_eq!(config.report_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Text);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("no"));
        assert!(!parse_flag(""));
    }
}
