//! Cancellable one-shot delay used to coalesce bursts of change events.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// A scheduled action that runs after a delay unless cancelled first.
///
/// The timer and the cancellation token race inside one task; whichever
/// resolves first wins and the other has no effect. Once the action has
/// started it runs to completion even if [`PendingDelay::cancel`] is called.
#[derive(Debug)]
pub struct PendingDelay {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl PendingDelay {
    /// Run `action` after `duration` on a task tracked by `tracker`.
    ///
    /// The delay is also cancelled when `parent` is, so a shutdown reaches
    /// every delay that has not fired yet.
    pub fn schedule<F, Fut>(
        tracker: &TaskTracker,
        parent: &CancellationToken,
        duration: Duration,
        action: F,
    ) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = parent.child_token();
        let cancelled = token.clone();
        let handle = tracker.spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(duration) => action().await,
            }
        });
        Self { token, handle }
    }

    /// Stop the delay if it has not fired. Never blocks; repeated calls and
    /// calls after the action fired are no-ops.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// `true` once the delay either ran its action or observed cancellation.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
