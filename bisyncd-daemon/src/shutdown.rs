//! Lifecycle tracking for the daemon's background tasks.
//!
//! Every background context (periodic trigger, watch listener, debounce
//! delays) is spawned on one [`TaskTracker`] and observes one root
//! [`CancellationToken`]. Shutdown cancels the token, closes the tracker and
//! waits until every tracked task has exited.

use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

#[derive(Debug, Clone, Default)]
pub struct ShutdownCoordinator {
    cancel_token: CancellationToken,
    task_tracker: TaskTracker,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token cancelled when shutdown begins, scoped to one component.
    pub fn child_token(&self) -> CancellationToken {
        self.cancel_token.child_token()
    }

    pub fn tracker(&self) -> TaskTracker {
        self.task_tracker.clone()
    }

    fn is_shutting_down(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    fn active_tasks(&self) -> usize {
        self.task_tracker.len()
    }

    /// Spawn and track a background task.
    pub fn spawn<F>(&self, name: &'static str, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        tracing::debug!(task = name, "spawning tracked task");
        self.task_tracker.spawn(future)
    }

    /// Cancel every token, then wait for all tracked tasks to exit.
    ///
    /// A sync that is already running is not interrupted, so this returns
    /// only after it completes.
    pub async fn shutdown(&self) {
        if self.is_shutting_down() {
            tracing::debug!("shutdown already requested");
        }
        tracing::info!(
            active_tasks = self.active_tasks(),
            "shutting down background tasks"
        );
        self.cancel_token.cancel();
        self.task_tracker.close();
        self.task_tracker.wait().await;
        tracing::info!("all background tasks exited");
    }
}
