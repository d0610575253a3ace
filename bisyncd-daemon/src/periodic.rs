//! Repeating timer that drives interval syncs.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Invokes a callback every `period` until stopped.
///
/// The first invocation happens one full period after [`PeriodicTrigger::start`];
/// callers that want an immediate run do it themselves.
#[derive(Debug)]
pub struct PeriodicTrigger {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl PeriodicTrigger {
    /// # Panics
    /// Panics if `period` is zero (see [`tokio::time::interval_at`]).
    pub fn start<F, Fut>(
        tracker: &TaskTracker,
        token: CancellationToken,
        period: Duration,
        mut callback: F,
    ) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let stop = token.clone();
        let handle = tracker.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            // A sync can outlast the period; don't fire a burst of catch-up ticks.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = stop.cancelled() => break,
                    _ = ticker.tick() => callback().await,
                }
            }
            tracing::debug!("periodic trigger stopped");
        });
        Self { token, handle }
    }

    /// Stop the timer and wait for its task to exit. A callback that is
    /// already running finishes first; no callback starts afterwards.
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(err) = self.handle.await {
            tracing::error!(error = %err, "periodic trigger task failed");
        }
    }
}
