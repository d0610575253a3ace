//! bisync daemon runtime: sync coordinator, triggers, watcher, systemd unit.

pub mod coordinator;
pub mod debounce;
mod error;
pub mod guard;
pub mod paths;
pub mod periodic;
pub mod permissions;
mod runtime;
pub mod shutdown;
pub mod systemd;
pub mod watcher;

pub use coordinator::{ChangeDisposition, SyncCoordinator, SyncOutcome};
pub use error::DaemonError;
pub use runtime::{init_tracing, resync_blocking, run, run_until, start_blocking, DaemonOptions};
pub use shutdown::ShutdownCoordinator;
pub use systemd::{
    generate_unit, install as install_systemd, uninstall as uninstall_systemd, Registration,
};
