//! Domain types for the bisync daemon.
//!
//! Everything here is validated once at startup and then shared read-only
//! for the lifetime of the process.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{io_err, ConfigError};

/// Default period of the interval-triggered sync.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(60 * 5);

/// Default quiet period after the last filesystem change before syncing.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(30);

/// Upper bound for both timers (one year). Larger values overflow the
/// runtime's deadline arithmetic.
pub const MAX_TIMER_SECS: u64 = 365 * 24 * 60 * 60;

// ---------------------------------------------------------------------------
// SyncTarget
// ---------------------------------------------------------------------------

/// The local directory and the rclone remote path reconciled by bisync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    local: PathBuf,
    remote: String,
}

impl SyncTarget {
    /// Validate and build a target.
    ///
    /// `local` must exist and be a directory; it is canonicalized so the
    /// target stays meaningful regardless of the caller's working directory.
    /// `remote` must be non-empty.
    pub fn new(local: impl Into<PathBuf>, remote: impl Into<String>) -> Result<Self, ConfigError> {
        let local = local.into();
        let remote = remote.into();

        if local.as_os_str().is_empty() {
            return Err(ConfigError::MissingArgument("dir"));
        }
        let meta = match fs::metadata(&local) {
            Ok(meta) => meta,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(ConfigError::DirectoryNotFound { path: local });
            }
            Err(err) => return Err(io_err(&local, err)),
        };
        if !meta.is_dir() {
            return Err(ConfigError::NotADirectory { path: local });
        }
        if remote.trim().is_empty() {
            return Err(ConfigError::MissingArgument("remote-dir"));
        }

        let local = fs::canonicalize(&local).map_err(|e| io_err(&local, e))?;
        Ok(Self { local, remote })
    }

    pub fn local(&self) -> &Path {
        &self.local
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }
}

impl fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.local.display(), self.remote)
    }
}

// ---------------------------------------------------------------------------
// SyncMode
// ---------------------------------------------------------------------------

/// Which argument profile a sync invocation uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncMode {
    /// Regular bisync against the existing baseline.
    Incremental,
    /// Full-baseline bisync (`--resync`). Used at daemon startup, for the
    /// manual `resync` command, and right after service registration.
    Resync,
}

impl SyncMode {
    pub fn is_resync(self) -> bool {
        matches!(self, SyncMode::Resync)
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Incremental => f.write_str("incremental"),
            SyncMode::Resync => f.write_str("resync"),
        }
    }
}

// ---------------------------------------------------------------------------
// DaemonSettings
// ---------------------------------------------------------------------------

/// Timer settings for the daemon loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaemonSettings {
    pub sync_interval: Duration,
    pub debounce: Duration,
}

impl DaemonSettings {
    pub fn new(sync_interval: Duration, debounce: Duration) -> Result<Self, ConfigError> {
        if sync_interval < Duration::from_secs(1) {
            return Err(ConfigError::ZeroInterval);
        }
        let max = Duration::from_secs(MAX_TIMER_SECS);
        for (flag, value) in [("sync-interval", sync_interval), ("debounce", debounce)] {
            if value > max {
                return Err(ConfigError::DurationTooLong {
                    flag,
                    max_secs: MAX_TIMER_SECS,
                });
            }
        }
        Ok(Self {
            sync_interval,
            debounce,
        })
    }

    pub fn from_secs(sync_interval: u64, debounce: u64) -> Result<Self, ConfigError> {
        Self::new(
            Duration::from_secs(sync_interval),
            Duration::from_secs(debounce),
        )
    }
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            sync_interval: DEFAULT_SYNC_INTERVAL,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}
