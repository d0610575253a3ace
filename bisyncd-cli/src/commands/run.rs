//! `rclone-bisync-daemon run`: foreground daemon loop.

use std::sync::Arc;

use anyhow::{Context, Result};

use bisyncd_core::config;
use bisyncd_daemon::start_blocking;
use bisyncd_sync::RcloneRunner;

use super::DaemonArgs;

pub fn run(args: DaemonArgs) -> Result<()> {
    let config = config::load().context("failed to load config file")?;
    let options = args.options(&config)?;
    let runner = Arc::new(RcloneRunner::new(config.rclone_program()));

    start_blocking(options, runner).context("daemon exited with error")
}
