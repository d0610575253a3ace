//! The fixed rclone bisync argument profile.

use std::ffi::OsString;

use bisyncd_core::{SyncMode, SyncTarget};

/// Flags passed on every invocation, after `bisync <local> <remote>`.
pub const BISYNC_FLAGS: &[&str] = &[
    "--create-empty-src-dirs",
    "--compare",
    "size,modtime,checksum",
    "--slow-hash-sync-only",
    "--resilient",
    "-MvP",
    "--drive-skip-gdocs",
    "--fix-case",
];

/// Appended only for [`SyncMode::Resync`].
pub const RESYNC_FLAG: &str = "--resync";

/// Full argv (minus the program) for one bisync run.
pub fn bisync_args(target: &SyncTarget, mode: SyncMode) -> Vec<OsString> {
    let mut args = Vec::with_capacity(BISYNC_FLAGS.len() + 4);
    args.push(OsString::from("bisync"));
    args.push(target.local().as_os_str().to_owned());
    args.push(OsString::from(target.remote()));
    args.extend(BISYNC_FLAGS.iter().map(OsString::from));
    if mode.is_resync() {
        args.push(OsString::from(RESYNC_FLAG));
    }
    args
}
