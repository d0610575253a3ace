//! The single entry point that launches bisync.
//!
//! [`SyncCoordinator`] owns the [`SyncGuard`] and the one pending debounce
//! delay. Interval ticks, filesystem changes and one-shot commands all end up
//! in [`SyncCoordinator::request_sync`]; requests that arrive while a sync is
//! running are dropped.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use bisyncd_core::{SyncMode, SyncTarget};
use bisyncd_sync::SyncRunner;

use crate::debounce::PendingDelay;
use crate::guard::SyncGuard;

/// What happened to one sync request.
#[derive(Debug)]
pub enum SyncOutcome {
    Completed {
        mode: SyncMode,
        duration: Duration,
        output: String,
    },
    Failed {
        mode: SyncMode,
        duration: Duration,
        error: String,
        output: Option<String>,
    },
    /// Another sync held the guard; nothing ran.
    Skipped,
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SyncOutcome::Completed { .. })
    }

    pub fn ran(&self) -> bool {
        !matches!(self, SyncOutcome::Skipped)
    }
}

/// How a filesystem change notification was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeDisposition {
    /// A fresh debounce delay replaced any earlier one.
    Scheduled,
    /// A sync is running or the daemon is shutting down; the event is dropped.
    Ignored,
}

pub struct SyncCoordinator {
    target: SyncTarget,
    runner: Arc<dyn SyncRunner>,
    guard: SyncGuard,
    pending: Mutex<Option<PendingDelay>>,
    debounce: Duration,
    tracker: TaskTracker,
    token: CancellationToken,
}

impl SyncCoordinator {
    /// `tracker` and `token` come from the daemon's shutdown coordinator so
    /// debounce delays are cancelled and awaited on shutdown.
    pub fn new(
        target: SyncTarget,
        runner: Arc<dyn SyncRunner>,
        debounce: Duration,
        tracker: TaskTracker,
        token: CancellationToken,
    ) -> Arc<Self> {
        Arc::new(Self {
            target,
            runner,
            guard: SyncGuard::new(),
            pending: Mutex::new(None),
            debounce,
            tracker,
            token,
        })
    }

    pub fn target(&self) -> &SyncTarget {
        &self.target
    }

    pub fn is_syncing(&self) -> bool {
        self.guard.is_held()
    }

    /// Run one sync unless another is in progress.
    ///
    /// The subprocess runs on the blocking pool; the guard is held until it
    /// exits and is released on every path, including a panicking runner.
    pub async fn request_sync(&self, mode: SyncMode, source: &'static str) -> SyncOutcome {
        let Some(_permit) = self.guard.try_acquire() else {
            tracing::debug!(source, mode = %mode, "sync already in progress; request dropped");
            return SyncOutcome::Skipped;
        };

        tracing::info!(source, mode = %mode, target = %self.target, "syncing started");
        let started = Instant::now();
        let runner = Arc::clone(&self.runner);
        let target = self.target.clone();
        let result = tokio::task::spawn_blocking(move || runner.run(&target, mode)).await;
        let duration = started.elapsed();

        match result {
            Ok(Ok(synced)) => {
                tracing::info!(
                    source,
                    mode = %mode,
                    duration_ms = duration.as_millis() as u64,
                    finished_at = %synced.finished_at,
                    "syncing finished",
                );
                if !synced.output.is_empty() {
                    tracing::debug!(output = %synced.output, "bisync output");
                }
                SyncOutcome::Completed {
                    mode,
                    duration,
                    output: synced.output,
                }
            }
            Ok(Err(err)) => {
                let output = err.output().map(str::to_string);
                tracing::error!(
                    source,
                    mode = %mode,
                    error = %err,
                    output = output.as_deref().unwrap_or(""),
                    "syncing failed",
                );
                SyncOutcome::Failed {
                    mode,
                    duration,
                    error: err.to_string(),
                    output,
                }
            }
            Err(err) => {
                tracing::error!(source, mode = %mode, error = %err, "sync task aborted");
                SyncOutcome::Failed {
                    mode,
                    duration,
                    error: format!("sync task join error: {err}"),
                    output: None,
                }
            }
        }
    }

    /// React to one filesystem change.
    ///
    /// While a sync runs the change is ignored outright; it will be seen again
    /// by a later poll or caught by the next interval sync. Otherwise any
    /// pending delay is cancelled and replaced, so only the last change of a
    /// burst leads to a sync, `debounce` after it arrived.
    pub fn notify_change(self: &Arc<Self>) -> ChangeDisposition {
        if self.token.is_cancelled() {
            return ChangeDisposition::Ignored;
        }
        if self.guard.is_held() {
            tracing::debug!("sync in progress; change event ignored");
            return ChangeDisposition::Ignored;
        }

        let mut slot = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.take() {
            previous.cancel();
        }
        let coordinator = Arc::clone(self);
        *slot = Some(PendingDelay::schedule(
            &self.tracker,
            &self.token,
            self.debounce,
            move || async move {
                coordinator
                    .request_sync(SyncMode::Incremental, "watcher")
                    .await;
            },
        ));
        ChangeDisposition::Scheduled
    }

    /// Cancel the pending debounce delay, if any.
    pub fn cancel_pending(&self) {
        let mut slot = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.take() {
            previous.cancel();
        }
    }

    /// `true` while a debounce delay is waiting to fire.
    pub fn has_pending(&self) -> bool {
        let slot = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .map(|delay| !delay.is_finished() && !delay.is_cancelled())
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for SyncCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCoordinator")
            .field("target", &self.target)
            .field("syncing", &self.guard.is_held())
            .field("debounce", &self.debounce)
            .finish_non_exhaustive()
    }
}
