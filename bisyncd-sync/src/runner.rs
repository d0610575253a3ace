//! Subprocess-backed sync invocation.
//!
//! The daemon only cares about two things from rclone: whether it exited
//! successfully, and what it printed. [`SyncRunner`] is the seam between the
//! coordinator and the real process so the coordinator can be exercised with
//! in-memory fakes.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use chrono::{DateTime, Utc};

use bisyncd_core::{SyncMode, SyncTarget};

use crate::command::bisync_args;
use crate::error::SyncError;

/// Result of a successful invocation.
#[derive(Debug, Clone)]
pub struct SyncOutput {
    /// stdout followed by stderr.
    pub output: String,
    pub finished_at: DateTime<Utc>,
}

/// Runs one blocking sync invocation.
pub trait SyncRunner: Send + Sync + 'static {
    fn run(&self, target: &SyncTarget, mode: SyncMode) -> Result<SyncOutput, SyncError>;
}

/// Invokes `rclone bisync` with the fixed argument profile.
#[derive(Debug, Clone)]
pub struct RcloneRunner {
    program: PathBuf,
}

impl RcloneRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for RcloneRunner {
    fn default() -> Self {
        Self::new(bisyncd_core::config::DEFAULT_RCLONE)
    }
}

impl SyncRunner for RcloneRunner {
    fn run(&self, target: &SyncTarget, mode: SyncMode) -> Result<SyncOutput, SyncError> {
        tracing::debug!(
            program = %self.program.display(),
            target = %target,
            mode = %mode,
            "spawning bisync",
        );

        let output = Command::new(&self.program)
            .args(bisync_args(target, mode))
            .stdin(Stdio::null())
            .output()
            .map_err(|source| SyncError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let combined = combine_output(&output.stdout, &output.stderr);
        if output.status.success() {
            Ok(SyncOutput {
                output: combined,
                finished_at: Utc::now(),
            })
        } else {
            Err(SyncError::Failed {
                status: output.status,
                output: combined,
            })
        }
    }
}

fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);
    let stdout = stdout.trim_end();
    let stderr = stderr.trim_end();
    match (stdout.is_empty(), stderr.is_empty()) {
        (true, true) => String::new(),
        (false, true) => stdout.to_string(),
        (true, false) => stderr.to_string(),
        (false, false) => format!("{stdout}\n{stderr}"),
    }
}
