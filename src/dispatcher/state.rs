//! Per-user dialog state.

use std::collections::HashMap;

use chrono::NaiveDate;
use tokio::sync::RwLock;

/// Telegram user identifier.
pub type UserId = i64;

/// Where the user is in the period selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodStage {
    #[default]
    Idle,
    AwaitingFrom,
    AwaitingTo,
}

/// Selection state of one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DialogState {
    pub stage: PeriodStage,
    pub period_from: Option<NaiveDate>,
}

impl DialogState {
    /// Starts a period selection.
    pub fn begin_period(&mut self) {
        self.stage = PeriodStage::AwaitingFrom;
    }

    /// Remembers the first day and waits for the last one.
    pub fn set_from(&mut self, day: NaiveDate) {
        self.period_from = Some(day);
        self.stage = PeriodStage::AwaitingTo;
    }

    /// Clears the selection.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.stage == PeriodStage::Idle && self.period_from.is_none()
    }
}

/// Dialog states of all users, kept in memory only.
#[derive(Debug, Default)]
pub struct DialogStore {
    states: RwLock<HashMap<UserId, DialogState>>,
}

impl DialogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the state of a user (idle if unknown).
    pub async fn get(&self, user: UserId) -> DialogState {
        self.states
            .read()
            .await
            .get(&user)
            .copied()
            .unwrap_or_default()
    }

    /// Applies `f` to the user's state; idle states are dropped.
    pub async fn update<R>(&self, user: UserId, f: impl FnOnce(&mut DialogState) -> R) -> R {
        let mut states = self.states.write().await;
        let state = states.entry(user).or_default();
        let result = f(state);
        if state.is_idle() {
            states.remove(&user);
        }
        result
    }

    /// Number of users with a selection in progress.
    #[cfg(test)]
    pub async fn active_count(&self) -> usize {
        self.states.read().await.len()
    }
}
