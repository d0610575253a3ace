pub mod register;
pub mod resync;
pub mod run;
pub mod unregister;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use bisyncd_core::{FileConfig, SyncTarget};
use bisyncd_daemon::{DaemonOptions, SyncOutcome};

/// The two sides of the sync.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Path to the local directory to sync.
    #[arg(long, value_name = "PATH")]
    pub dir: PathBuf,

    /// Path to the remote directory to sync (rclone syntax, e.g. `gdrive:docs`).
    #[arg(long = "remote-dir", value_name = "PATH")]
    pub remote_dir: String,
}

impl TargetArgs {
    pub fn target(&self) -> Result<SyncTarget> {
        SyncTarget::new(&self.dir, self.remote_dir.clone()).context("invalid sync target")
    }
}

/// Target plus timer settings, shared by `run` and `register`.
#[derive(Args, Debug)]
pub struct DaemonArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// How often to auto sync the directories, in seconds [default: 300].
    #[arg(long = "sync-interval", value_name = "SECONDS")]
    pub sync_interval: Option<u64>,

    /// Quiet period after the last file change before syncing, in seconds [default: 30].
    #[arg(long, value_name = "SECONDS")]
    pub debounce: Option<u64>,
}

impl DaemonArgs {
    /// Validate the target first, then merge timer flags over the config file.
    pub fn options(&self, config: &FileConfig) -> Result<DaemonOptions> {
        let target = self.target.target()?;
        let settings = config
            .settings(self.sync_interval, self.debounce)
            .context("invalid timer settings")?;
        Ok(DaemonOptions { target, settings })
    }
}

/// Print a one-line summary of a one-shot sync.
pub(crate) fn print_outcome(outcome: &SyncOutcome) {
    match outcome {
        SyncOutcome::Completed { duration, .. } => {
            println!(
                "{} resync finished in {:.1}s",
                "✓".green(),
                duration.as_secs_f64()
            );
        }
        SyncOutcome::Failed { error, output, .. } => {
            eprintln!("{} resync failed: {error}", "✗".red());
            if let Some(output) = output {
                eprintln!("{output}");
            }
        }
        SyncOutcome::Skipped => println!("resync skipped: another sync is running"),
    }
}
