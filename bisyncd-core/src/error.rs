//! Error types for bisyncd-core.

use std::path::PathBuf;

use thiserror::Error;

/// Startup configuration failures. All of them are fatal: the daemon never
/// starts with a half-validated target.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required flag was not supplied (or was supplied empty).
    #[error("--{0} is required")]
    MissingArgument(&'static str),

    #[error("directory {path} does not exist")]
    DirectoryNotFound { path: PathBuf },

    #[error("{path} is not a directory")]
    NotADirectory { path: PathBuf },

    /// The sync interval drives a repeating timer and cannot be zero.
    #[error("sync interval must be at least one second")]
    ZeroInterval,

    /// A timer flag beyond [`MAX_TIMER_SECS`](crate::types::MAX_TIMER_SECS).
    #[error("--{flag} must be at most {max_secs} seconds")]
    DurationTooLong { flag: &'static str, max_secs: u64 },

    /// Underlying I/O failure, annotated with the path involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The YAML config file exists but could not be parsed.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
