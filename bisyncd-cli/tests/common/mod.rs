//! Shared helpers: fake `rclone` and `systemctl` scripts that append their argv to a log.
#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::{Duration, Instant};

pub const BIN: &str = env!("CARGO_BIN_EXE_rclone-bisync-daemon");

pub struct FakeRclone {
    pub program: PathBuf,
    pub log: PathBuf,
}

impl FakeRclone {
    pub fn install(dir: &Path, exit_code: i32) -> Self {
        let log = dir.join("rclone-calls.log");
        let program = dir.join("rclone");
        fs::write(
            &program,
            format!(
                "#!/bin/sh\necho \"$@\" >> '{}'\necho 'fake rclone output'\nexit {exit_code}\n",
                log.display()
            ),
        )
        .expect("write fake rclone");
        fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).expect("chmod");
        Self { program, log }
    }

    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .map(|raw| raw.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

/// A `systemctl` stand-in recording its argv; put `dir` first on `PATH`.
pub struct FakeSystemctl {
    pub log: PathBuf,
}

impl FakeSystemctl {
    pub fn install(dir: &Path, exit_code: i32) -> Self {
        let log = dir.join("systemctl-calls.log");
        let program = dir.join("systemctl");
        fs::write(
            &program,
            format!(
                "#!/bin/sh\necho \"$@\" >> '{}'\nexit {exit_code}\n",
                log.display()
            ),
        )
        .expect("write fake systemctl");
        fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).expect("chmod");
        Self { log }
    }

    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .map(|raw| raw.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

/// `dir` prepended to the current `PATH`.
pub fn path_with(dir: &Path) -> std::ffi::OsString {
    let mut paths = vec![dir.to_path_buf()];
    if let Some(current) = std::env::var_os("PATH") {
        paths.extend(std::env::split_paths(&current));
    }
    std::env::join_paths(paths).expect("join PATH")
}

pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        sleep(Duration::from_millis(100));
    }
    false
}
