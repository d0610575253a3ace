//! `rclone-bisync-daemon resync`: one full-baseline sync.

use std::sync::Arc;

use anyhow::{bail, Context, Result};

use bisyncd_core::config;
use bisyncd_daemon::resync_blocking;
use bisyncd_sync::RcloneRunner;

use super::{print_outcome, TargetArgs};

pub fn run(args: TargetArgs) -> Result<()> {
    let config = config::load().context("failed to load config file")?;
    let target = args.target()?;
    let runner = Arc::new(RcloneRunner::new(config.rclone_program()));

    let outcome = resync_blocking(target, runner, "manual").context("resync could not run")?;
    print_outcome(&outcome);
    if !outcome.is_success() {
        bail!("resync failed");
    }
    Ok(())
}
