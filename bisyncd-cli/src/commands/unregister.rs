//! `rclone-bisync-daemon unregister`: remove the systemd user service.

use anyhow::{Context, Result};

use bisyncd_daemon::{paths::unit_path, uninstall_systemd};

pub fn run() -> Result<()> {
    let home = dirs::home_dir().context("could not determine home directory")?;

    if uninstall_systemd(&home).context("failed to unregister systemd service")? {
        println!("removed {}", unit_path(&home).display());
    } else {
        println!("rclone bisync daemon is not registered");
    }
    Ok(())
}
