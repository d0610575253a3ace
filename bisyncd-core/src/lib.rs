//! bisyncd core library: domain types, startup validation, config file.
//!
//! - [`types`]: [`SyncTarget`], [`SyncMode`], [`DaemonSettings`]
//! - [`config`]: optional `~/.config/bisyncd/config.yaml`
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::FileConfig;
pub use error::ConfigError;
pub use types::{
    DaemonSettings, SyncMode, SyncTarget, DEFAULT_DEBOUNCE, DEFAULT_SYNC_INTERVAL, MAX_TIMER_SECS,
};
