//! Optional YAML config file.
//!
//! # Storage layout
//!
//! ```text
//! ~/.config/bisyncd/config.yaml
//! ```
//!
//! Every key is optional. Precedence, lowest first: built-in defaults, this
//! file, the `BISYNCD_RCLONE` environment variable, command-line flags.
//!
//! Like the rest of this crate, functions take an explicit `home` in their
//! `_at` form so tests can point them at a `TempDir`.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::types::DaemonSettings;

/// Environment variable overriding the rclone program.
pub const RCLONE_ENV: &str = "BISYNCD_RCLONE";

/// Program name used when nothing overrides it.
pub const DEFAULT_RCLONE: &str = "rclone";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Path or name of the rclone executable.
    pub rclone: Option<PathBuf>,
    pub sync_interval_secs: Option<u64>,
    pub debounce_secs: Option<u64>,
}

/// `<home>/.config/bisyncd/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".config").join("bisyncd").join("config.yaml")
}

/// Load the config file under `home`. A missing file yields the defaults.
pub fn load_at(home: &Path) -> Result<FileConfig, ConfigError> {
    let path = config_path_at(home);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(FileConfig::default()),
        Err(err) => return Err(io_err(&path, err)),
    };
    if raw.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })
}

/// Load the config file from the current user's home directory.
pub fn load() -> Result<FileConfig, ConfigError> {
    load_at(&home()?)
}

pub fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

impl FileConfig {
    /// Merge CLI flag values (seconds) over the file values and defaults.
    pub fn settings(
        &self,
        sync_interval_flag: Option<u64>,
        debounce_flag: Option<u64>,
    ) -> Result<DaemonSettings, ConfigError> {
        let defaults = DaemonSettings::default();
        let sync_interval = sync_interval_flag
            .or(self.sync_interval_secs)
            .map(Duration::from_secs)
            .unwrap_or(defaults.sync_interval);
        let debounce = debounce_flag
            .or(self.debounce_secs)
            .map(Duration::from_secs)
            .unwrap_or(defaults.debounce);
        DaemonSettings::new(sync_interval, debounce)
    }

    /// The rclone program to invoke, honouring `BISYNCD_RCLONE`.
    pub fn rclone_program(&self) -> PathBuf {
        resolve_rclone_program(std::env::var_os(RCLONE_ENV), self)
    }
}

fn resolve_rclone_program(env_value: Option<OsString>, file: &FileConfig) -> PathBuf {
    env_value
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| file.rclone.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_RCLONE))
}
