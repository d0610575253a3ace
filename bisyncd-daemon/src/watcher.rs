//! Filesystem change source.
//!
//! The local tree is polled recursively every [`POLL_INTERVAL`]. A mode-bit
//! rescan runs on the same period, since the poller does not see `chmod`.
//! Relevant events from both go through a one-slot buffer: while an event is
//! waiting to be consumed, further events from the same polling window are
//! dropped, since one pending change is all the debounce logic needs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::event::{MetadataKind, ModifyKind};
use notify::{Config, Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::coordinator::{ChangeDisposition, SyncCoordinator};
use crate::error::DaemonError;
use crate::paths::POLL_INTERVAL;
use crate::permissions::PermissionSnapshot;

/// Watch `root` and feed changes to `coordinator` until `token` is cancelled.
pub async fn watch_task(
    root: PathBuf,
    coordinator: Arc<SyncCoordinator>,
    token: CancellationToken,
) -> Result<(), DaemonError> {
    let (event_tx, mut event_rx) = mpsc::channel::<Event>(1);
    let (error_tx, mut error_rx) = mpsc::unbounded_channel::<notify::Error>();

    let permission_tx = event_tx.clone();
    let _watcher = start_poll_watcher(&root, event_tx, error_tx)?;
    let mut modes = scan_permissions(&root).await?;
    let mut rescan = interval_at(Instant::now() + POLL_INTERVAL, POLL_INTERVAL);
    rescan.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::info!(path = %root.display(), entries = modes.len(), "watching local directory");

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = rescan.tick() => {
                let current = scan_permissions(&root).await?;
                if let Some(path) = current.changed_since(&modes).into_iter().next() {
                    let event = Event::new(EventKind::Modify(ModifyKind::Metadata(
                        MetadataKind::Permissions,
                    )))
                    .add_path(path);
                    let _ = permission_tx.try_send(event);
                }
                modes = current;
            }
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                tracing::debug!(kind = ?event.kind, paths = ?event.paths, "received fs event");
                if coordinator.notify_change() == ChangeDisposition::Ignored {
                    tracing::debug!("fs event dropped");
                }
            }
            Some(err) = error_rx.recv() => {
                tracing::warn!(error = %err, "watcher error");
            }
        }
    }

    tracing::debug!("filesystem watcher stopped");
    Ok(())
}

async fn scan_permissions(root: &Path) -> Result<PermissionSnapshot, DaemonError> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || PermissionSnapshot::scan(&root))
        .await
        .map_err(|err| DaemonError::Join {
            task: "permission scan",
            message: err.to_string(),
        })
}

fn start_poll_watcher(
    root: &Path,
    event_tx: mpsc::Sender<Event>,
    error_tx: mpsc::UnboundedSender<notify::Error>,
) -> Result<PollWatcher, DaemonError> {
    let config = Config::default().with_poll_interval(POLL_INTERVAL);
    let mut watcher = PollWatcher::new(
        move |result: notify::Result<Event>| match result {
            Ok(event) => {
                if is_relevant_event_kind(&event.kind) {
                    // Full buffer: a change is already pending, drop this one.
                    let _ = event_tx.try_send(event);
                }
            }
            Err(err) => {
                let _ = error_tx.send(err);
            }
        },
        config,
    )?;
    watcher.watch(root, RecursiveMode::Recursive)?;
    Ok(watcher)
}

/// Creates, removals, renames/moves, content writes and permission changes.
pub fn is_relevant_event_kind(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) | EventKind::Remove(_) => true,
        EventKind::Modify(modify) => matches!(
            modify,
            ModifyKind::Any
                | ModifyKind::Data(_)
                | ModifyKind::Name(_)
                | ModifyKind::Metadata(
                    MetadataKind::Any | MetadataKind::WriteTime | MetadataKind::Permissions
                )
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, RemoveKind, RenameMode};

    #[test]
    fn change_kinds_that_trigger_sync() {
        for kind in [
            EventKind::Create(CreateKind::File),
            EventKind::Create(CreateKind::Folder),
            EventKind::Remove(RemoveKind::Any),
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime)),
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
            EventKind::Modify(ModifyKind::Any),
        ] {
            assert!(is_relevant_event_kind(&kind), "{kind:?} should be relevant");
        }
    }

    #[test]
    fn access_and_unrelated_metadata_are_ignored() {
        for kind in [
            EventKind::Access(AccessKind::Any),
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::AccessTime)),
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Ownership)),
            EventKind::Modify(ModifyKind::Other),
            EventKind::Other,
            EventKind::Any,
        ] {
            assert!(!is_relevant_event_kind(&kind), "{kind:?} should be ignored");
        }
    }

    #[tokio::test]
    async fn one_slot_buffer_drops_excess_events() {
        let (tx, mut rx) = mpsc::channel::<Event>(1);
        let event = || Event::new(EventKind::Create(CreateKind::File));

        assert!(tx.try_send(event()).is_ok());
        assert!(tx.try_send(event()).is_err(), "second event must not queue");
        assert!(rx.recv().await.is_some());
        assert!(tx.try_send(event()).is_ok(), "slot is free again once drained");
    }
}
