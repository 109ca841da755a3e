//! HTTP client for the iiko server API.

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::olap::{OlapRow, rows_from_response, transactions_request};
use crate::config::IikoConfig;

/// Token lifetime is about ten minutes on the server; renew earlier.
const TOKEN_LIFETIME: Duration = Duration::from_secs(8 * 60);

/// Errors that can occur while talking to iiko.
#[derive(Debug, Error)]
pub enum IikoError {
    #[error("IIKO_LOGIN/IIKO_PASSWORD are not set")]
    MissingCredentials,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("iiko returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("iiko returned an empty access token")]
    EmptyToken,

    #[error("Invalid OLAP response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// iiko API client with access token caching.
pub struct IikoClient {
    http: reqwest::Client,
    config: IikoConfig,
    token: Mutex<Option<CachedToken>>,
}

impl IikoClient {
    /// Creates a new client.
    pub fn new(config: IikoConfig) -> Result<Self, IikoError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            http,
            config,
            token: Mutex::new(None),
        })
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &IikoConfig {
        &self.config
    }

    /// Requests a fresh access token and caches it.
    pub async fn auth(&self) -> Result<String, IikoError> {
        let mut cached = self.token.lock().await;
        let token = self.request_token().await?;
        *cached = Some(CachedToken {
            value: token.clone(),
            expires_at: Instant::now() + TOKEN_LIFETIME,
        });
        Ok(token)
    }

    /// Returns a valid token, authenticating when needed.
    pub async fn ensure_token(&self) -> Result<String, IikoError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_valid()) {
            return Ok(token.value.clone());
        }

        let token = self.request_token().await?;
        *cached = Some(CachedToken {
            value: token.clone(),
            expires_at: Instant::now() + TOKEN_LIFETIME,
        });
        Ok(token)
    }

    /// Drops the cached token so the next request authenticates again.
    pub async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    async fn request_token(&self) -> Result<String, IikoError> {
        if self.config.login.is_empty() || self.config.password.is_empty() {
            return Err(IikoError::MissingCredentials);
        }

        let url = format!("{}/api/0/auth/access_token", self.config.base_url);
        debug!("Requesting iiko access token for {}", self.config.login);

        let resp = self
            .http
            .post(&url)
            .form(&[
                ("user_id", self.config.login.as_str()),
                ("user_secret", self.config.password.as_str()),
            ])
            .timeout(self.config.auth_timeout)
            .send()
            .await?;
        let resp = check_status(resp, &url)?;

        let token = resp.text().await?.trim().trim_matches('"').to_owned();
        if token.is_empty() {
            return Err(IikoError::EmptyToken);
        }

        info!("Obtained iiko access token");
        Ok(token)
    }

    /// Fetches the TRANSACTIONS OLAP report for the inclusive day range.
    pub async fn fetch_olap_transactions(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<OlapRow>, IikoError> {
        let url = format!("{}/api/0/olap_report/report", self.config.base_url);
        let payload = transactions_request(from, to);
        debug!("Fetching TRANSACTIONS report {} .. {}", from, to);

        let body = self
            .send_authorized(&url, |token| {
                self.http.post(&url).bearer_auth(token).json(&payload)
            })
            .await?;

        Ok(rows_from_response(&body))
    }

    /// Fetches an OLAP report by preset for the half-open range
    /// `[date_from, date_to)`.
    pub async fn fetch_olap_by_preset(
        &self,
        preset_id: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Vec<OlapRow>, IikoError> {
        let url = format!(
            "{}/resto/api/v2/reports/olap/byPresetId/{}",
            self.config.base_url, preset_id
        );
        let query = [
            ("dateFrom", date_from.to_string()),
            ("dateTo", date_to.to_string()),
        ];
        debug!("Fetching preset {} report {} .. {}", preset_id, date_from, date_to);

        let body = self
            .send_authorized(&url, |token| {
                self.http.get(&url).bearer_auth(token).query(&query)
            })
            .await?;

        Ok(rows_from_response(&body))
    }

    /// Sends an authorized request, re-authenticating once on 401.
    async fn send_authorized<F>(&self, url: &str, build: F) -> Result<Value, IikoError>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let token = self.ensure_token().await?;
        let resp = build(&token)
            .timeout(self.config.report_timeout)
            .send()
            .await?;

        let resp = if resp.status() == StatusCode::UNAUTHORIZED {
            warn!("iiko rejected the cached token, re-authenticating");
            self.invalidate_token().await;
            let token = self.auth().await?;
            build(&token)
                .timeout(self.config.report_timeout)
                .send()
                .await?
        } else {
            resp
        };

        let resp = check_status(resp, url)?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn check_status(resp: Response, url: &str) -> Result<Response, IikoError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(IikoError::Status {
            status: status.as_u16(),
            url: url.to_owned(),
        })
    }
}

impl std::fmt::Debug for IikoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IikoClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_token_expiry() {
        let fresh = CachedToken {
            value: "t".to_owned(),
            expires_at: Instant::now() + Duration::from_secs(60),
        };
        assert!(fresh.is_valid());

        let stale = CachedToken {
            value: "t".to_owned(),
            expires_at: Instant::now(),
        };
        assert!(!stale.is_valid());
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_request() {
        let config = IikoConfig::new("http://127.0.0.1:9", String::new(), String::new());
        let client = IikoClient::new(config).unwrap();
        let err = client.ensure_token().await.unwrap_err();
        assert!(matches!(err, IikoError::MissingCredentials));
    }
}
