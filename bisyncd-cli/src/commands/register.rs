//! `rclone-bisync-daemon register`: install the systemd user service.

use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;

use bisyncd_core::config;
use bisyncd_daemon::{install_systemd, resync_blocking};
use bisyncd_sync::RcloneRunner;

use super::{print_outcome, DaemonArgs};

pub fn run(args: DaemonArgs) -> Result<()> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    let config = config::load_at(&home).context("failed to load config file")?;
    // Validation happens before anything is written.
    let options = args.options(&config)?;
    let binary = std::env::current_exe().context("could not resolve the current executable")?;

    println!("adding daemon to systemd");
    let registration = install_systemd(&home, &binary, &options.target, &options.settings)
        .context("failed to register systemd service")?;
    println!("  unit: {}", registration.unit_path.display());

    for failure in &registration.failures {
        eprintln!("{} {failure}", "warning:".yellow().bold());
    }
    if registration.is_clean() {
        println!("{} rclone bisync daemon was successfully registered", "✓".green());
    }

    let runner = Arc::new(RcloneRunner::new(config.rclone_program()));
    let outcome = resync_blocking(options.target, runner, "register")
        .context("initial resync could not run")?;
    print_outcome(&outcome);
    Ok(())
}
