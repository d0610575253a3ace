use std::future::Future;
use std::sync::Arc;

use tokio_util::task::TaskTracker;
use tokio_util::sync::CancellationToken;

use bisyncd_core::{DaemonSettings, SyncMode, SyncTarget};
use bisyncd_sync::SyncRunner;

use crate::coordinator::{SyncCoordinator, SyncOutcome};
use crate::error::{io_err, DaemonError};
use crate::periodic::PeriodicTrigger;
use crate::shutdown::ShutdownCoordinator;
use crate::watcher::watch_task;

/// Everything the daemon loop needs, validated up front.
#[derive(Debug, Clone)]
pub struct DaemonOptions {
    pub target: SyncTarget,
    pub settings: DaemonSettings,
}

/// Start the daemon runtime and block the current thread until it exits.
pub fn start_blocking(
    options: DaemonOptions,
    runner: Arc<dyn SyncRunner>,
) -> Result<(), DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(options, runner))
}

/// Run the daemon until SIGINT or SIGTERM.
pub async fn run(options: DaemonOptions, runner: Arc<dyn SyncRunner>) -> Result<(), DaemonError> {
    run_until(options, runner, shutdown_signal()).await
}

/// Run the daemon until `stop` resolves.
///
/// Startup performs one full-baseline sync before anything else starts.
/// After that the interval timer and the filesystem watcher feed the
/// coordinator until shutdown, which waits for every background task.
pub async fn run_until<F>(
    options: DaemonOptions,
    runner: Arc<dyn SyncRunner>,
    stop: F,
) -> Result<(), DaemonError>
where
    F: Future<Output = ()>,
{
    let DaemonOptions { target, settings } = options;
    let shutdown = ShutdownCoordinator::new();
    let coordinator = SyncCoordinator::new(
        target.clone(),
        runner,
        settings.debounce,
        shutdown.tracker(),
        shutdown.child_token(),
    );

    tracing::info!(
        target = %target,
        sync_interval_secs = settings.sync_interval.as_secs(),
        debounce_secs = settings.debounce.as_secs(),
        "starting rclone bisync daemon",
    );

    coordinator.request_sync(SyncMode::Resync, "startup").await;

    let periodic = {
        let coordinator = coordinator.clone();
        PeriodicTrigger::start(
            &shutdown.tracker(),
            shutdown.child_token(),
            settings.sync_interval,
            move || {
                let coordinator = coordinator.clone();
                async move {
                    coordinator
                        .request_sync(SyncMode::Incremental, "interval")
                        .await;
                }
            },
        )
    };

    let watcher_handle = {
        let root = target.local().to_path_buf();
        let coordinator = coordinator.clone();
        let token = shutdown.child_token();
        shutdown.spawn("watcher", async move {
            if let Err(err) = watch_task(root, coordinator, token).await {
                tracing::error!(error = %err, "filesystem watcher unavailable; relying on interval syncs");
            }
        })
    };

    stop.await;
    tracing::info!("stop requested, shutting down daemon");

    coordinator.cancel_pending();
    periodic.stop().await;
    shutdown.shutdown().await;
    watcher_handle.await.map_err(|err| DaemonError::Join {
        task: "watcher",
        message: err.to_string(),
    })?;

    tracing::info!("daemon stopped");
    Ok(())
}

/// One full-baseline sync outside the daemon loop (`resync`, `register`).
pub fn resync_blocking(
    target: SyncTarget,
    runner: Arc<dyn SyncRunner>,
    source: &'static str,
) -> Result<SyncOutcome, DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(async move {
        let coordinator = SyncCoordinator::new(
            target,
            runner,
            std::time::Duration::ZERO,
            TaskTracker::new(),
            CancellationToken::new(),
        );
        Ok(coordinator.request_sync(SyncMode::Resync, source).await)
    })
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => tracing::info!("received ctrl-c"),
                    _ = terminate.recv() => tracing::info!("received SIGTERM"),
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "SIGTERM handler unavailable; waiting for ctrl-c");
                if let Err(err) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %err, "ctrl-c handler failed");
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "ctrl-c handler failed");
        }
    }
}

/// Install the fmt subscriber (`RUST_LOG`, default `info`). Safe to call twice.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
