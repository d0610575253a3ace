use std::path::{Path, PathBuf};
use std::time::Duration;

pub const UNIT_FILE: &str = "rclone-bisync-daemon.service";

/// How often the filesystem poller rescans the local tree.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Seconds systemd waits before restarting a failed daemon.
pub const RESTART_SEC: u64 = 5;

pub fn systemd_user_dir(home: &Path) -> PathBuf {
    home.join(".config").join("systemd").join("user")
}

pub fn unit_path(home: &Path) -> PathBuf {
    systemd_user_dir(home).join(UNIT_FILE)
}
