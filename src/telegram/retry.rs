//! Retry policy for Telegram uploads.
//!
//! Large documents hit transport timeouts now and then. Attempt `n` (0-based)
//! that fails with a transient error waits `delay_base × (n + 1)` before the
//! next one; a flood wait waits as long as Telegram asks.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use super::TelegramError;

/// Bounded linear backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    retries: u32,

    /// Base delay multiplied by the attempt number.
    delay_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_secs(2))
    }
}

impl RetryPolicy {
    /// Creates a new retry policy.
    #[must_use]
    pub const fn new(retries: u32, delay_base: Duration) -> Self {
        Self {
            retries,
            delay_base,
        }
    }

    /// Total number of attempts.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.retries + 1
    }

    /// Delay after failed attempt `attempt` (0-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.delay_base.saturating_mul(attempt.saturating_add(1))
    }

    /// Runs `op` until it succeeds, fails permanently or attempts run out.
    ///
    /// `op` receives the 0-based attempt number.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, TelegramError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, TelegramError>>,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.retries => {
                    let delay = match e {
                        TelegramError::FloodWait(seconds) => {
                            Duration::from_secs(u64::from(seconds)).max(self.delay_for(attempt))
                        }
                        _ => self.delay_for(attempt),
                    };
                    warn!(
                        "Attempt {}/{} failed: {}. Retrying in {:?}",
                        attempt + 1,
                        self.max_attempts(),
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    debug!("Giving up after {} attempt(s): {}", attempt + 1, e);
                    return Err(e);
                }
            }
        }
    }
}
