//! Error types for bisyncd-sync.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failures of a single sync invocation.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The sync program could not be started at all.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The sync program ran and exited unsuccessfully.
    #[error("bisync exited with {status}")]
    Failed { status: ExitStatus, output: String },
}

impl SyncError {
    /// Combined stdout/stderr of the failed run, if it produced any.
    pub fn output(&self) -> Option<&str> {
        match self {
            SyncError::Failed { output, .. } if !output.is_empty() => Some(output),
            _ => None,
        }
    }
}
