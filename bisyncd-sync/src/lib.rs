//! # bisyncd-sync
//!
//! Boundary to the external `rclone bisync` tool: the fixed argument profile
//! and a [`SyncRunner`] that executes it as a subprocess.

pub mod command;
pub mod error;
pub mod runner;

pub use command::{bisync_args, BISYNC_FLAGS, RESYNC_FLAG};
pub use error::SyncError;
pub use runner::{RcloneRunner, SyncOutput, SyncRunner};
