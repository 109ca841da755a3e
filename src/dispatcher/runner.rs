//! Update dispatcher loop.
//!
//! Pulls updates until shutdown, handing each one to its own task:
//! 1. shutdown fired → stop pulling
//! 2. update arrived → spawn a handler task
//! 3. a handler task finished → reap it, log panics
//!
//! After the loop, in-flight handlers are awaited and the source gets a
//! chance to persist its position.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info};

use crate::lifecycle::ShutdownSignal;
use crate::telegram::TelegramError;

/// Stream of incoming updates.
#[async_trait]
pub trait UpdateSource: Send {
    type Update: Send + 'static;

    /// Waits for the next update. Errors are fatal for the loop.
    async fn next_update(&mut self) -> Result<Self::Update, TelegramError>;

    /// Called once after the loop stopped.
    async fn finish(&mut self) {}
}

/// Handles one update.
#[async_trait]
pub trait UpdateSink: Send + Sync + 'static {
    type Update: Send + 'static;

    async fn handle(&self, update: Self::Update);
}

/// Feeds updates from a source into a sink.
pub struct Dispatcher<S, H> {
    source: S,
    sink: Arc<H>,
}

impl<S, H> Dispatcher<S, H>
where
    S: UpdateSource,
    H: UpdateSink<Update = S::Update>,
{
    /// Creates a new dispatcher.
    #[must_use]
    pub fn new(source: S, sink: Arc<H>) -> Self {
        Self { source, sink }
    }

    /// Runs the dispatcher loop until shutdown or a source error.
    pub async fn run(mut self, mut shutdown: ShutdownSignal) -> Result<(), TelegramError> {
        info!("Update dispatcher started");

        let mut tasks = JoinSet::new();

        let result = loop {
            tokio::select! {
                () = shutdown.wait() => {
                    info!("Dispatcher shutting down");
                    break Ok(());
                }
                update = self.source.next_update() => {
                    match update {
                        Ok(update) => {
                            let sink = Arc::clone(&self.sink);
                            tasks.spawn(async move { sink.handle(update).await });
                        }
                        Err(e) => {
                            error!("Update stream failed: {}", e);
                            break Err(e);
                        }
                    }
                }
                Some(done) = tasks.join_next(), if !tasks.is_empty() => {
                    reap(done);
                }
            }
        };

        if !tasks.is_empty() {
            info!("Waiting for {} in-flight update(s)", tasks.len());
        }
        while let Some(done) = tasks.join_next().await {
            reap(done);
        }

        self.source.finish().await;
        debug!("Update dispatcher stopped");
        result
    }
}

fn reap(done: Result<(), JoinError>) {
    if let Err(e) = done {
        error!("Update handler task failed: {}", e);
    }
}

impl<S, H> std::fmt::Debug for Dispatcher<S, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}
