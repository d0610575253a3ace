use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use bisyncd_core::{DaemonSettings, SyncTarget};

use crate::error::{io_err, DaemonError};
use crate::paths::{systemd_user_dir, unit_path, RESTART_SEC, UNIT_FILE};

/// Outcome of [`install`]. The unit file was written; `failures` lists the
/// `systemctl` calls that did not succeed.
#[derive(Debug)]
pub struct Registration {
    pub unit_path: PathBuf,
    pub failures: Vec<DaemonError>,
}

impl Registration {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Generate a systemd user unit that runs the daemon with the given target.
pub fn generate_unit(binary: &Path, target: &SyncTarget, settings: &DaemonSettings) -> String {
    let binary = binary.display().to_string();
    let local = target.local().display().to_string();
    let interval = settings.sync_interval.as_secs().to_string();
    let debounce = settings.debounce.as_secs().to_string();
    let exec_start = [
        binary.as_str(),
        "run",
        "--dir",
        local.as_str(),
        "--remote-dir",
        target.remote(),
        "--sync-interval",
        interval.as_str(),
        "--debounce",
        debounce.as_str(),
    ]
    .iter()
    .map(|arg| quote_exec_arg(arg))
    .collect::<Vec<_>>()
    .join(" ");

    format!(
        r#"[Unit]
Description=rclone bisync daemon
After=network-online.target
Wants=network-online.target

[Service]
Type=simple
ExecStart={exec_start}
Restart=on-failure
RestartSec={restart_sec}

[Install]
WantedBy=default.target
"#,
        exec_start = exec_start,
        restart_sec = RESTART_SEC,
    )
}

/// Write the unit under `<home>/.config/systemd/user`, then reload, enable
/// and start it.
pub fn install(
    home: &Path,
    binary: &Path,
    target: &SyncTarget,
    settings: &DaemonSettings,
) -> Result<Registration, DaemonError> {
    ensure_linux()?;
    install_with(home, binary, target, settings, Path::new("systemctl"))
}

/// [`install`] with an explicit `systemctl` program.
pub fn install_with(
    home: &Path,
    binary: &Path,
    target: &SyncTarget,
    settings: &DaemonSettings,
    systemctl: &Path,
) -> Result<Registration, DaemonError> {
    let dir = systemd_user_dir(home);
    if !dir.exists() {
        fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
    }

    let unit = unit_path(home);
    fs::write(&unit, generate_unit(binary, target, settings)).map_err(|e| io_err(&unit, e))?;
    tracing::info!(path = %unit.display(), "wrote systemd unit");

    let mut failures = Vec::new();
    for args in [
        &["daemon-reload"][..],
        &["enable", UNIT_FILE][..],
        &["start", UNIT_FILE][..],
    ] {
        if let Err(err) = run_systemctl(systemctl, args) {
            tracing::warn!(error = %err, "systemctl call failed");
            failures.push(err);
        }
    }

    Ok(Registration {
        unit_path: unit,
        failures,
    })
}

/// Stop, disable and remove the unit. Returns `false` if it was not installed.
pub fn uninstall(home: &Path) -> Result<bool, DaemonError> {
    ensure_linux()?;
    uninstall_with(home, Path::new("systemctl"))
}

/// [`uninstall`] with an explicit `systemctl` program.
pub fn uninstall_with(home: &Path, systemctl: &Path) -> Result<bool, DaemonError> {
    let unit = unit_path(home);
    if !unit.exists() {
        return Ok(false);
    }

    for args in [&["stop", UNIT_FILE][..], &["disable", UNIT_FILE][..]] {
        if let Err(err) = run_systemctl(systemctl, args) {
            tracing::warn!(error = %err, "systemctl call failed");
        }
    }
    fs::remove_file(&unit).map_err(|e| io_err(&unit, e))?;
    tracing::info!(path = %unit.display(), "removed systemd unit");
    if let Err(err) = run_systemctl(systemctl, &["daemon-reload"]) {
        tracing::warn!(error = %err, "systemctl call failed");
    }

    Ok(true)
}

#[cfg(target_os = "linux")]
fn ensure_linux() -> Result<(), DaemonError> {
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn ensure_linux() -> Result<(), DaemonError> {
    Err(DaemonError::ServiceManager(
        "systemd user services are only supported on Linux".to_string(),
    ))
}

fn run_systemctl(program: &Path, args: &[&str]) -> Result<(), DaemonError> {
    let output = Command::new(program)
        .arg("--user")
        .args(args)
        .output()
        .map_err(|e| io_err(program, e))?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Err(DaemonError::ServiceManager(format!(
        "systemctl --user {} failed (status {}): {} {}",
        args.join(" "),
        output.status,
        stdout,
        stderr
    )))
}

/// Quote one ExecStart word the way systemd's command-line parser expects.
fn quote_exec_arg(arg: &str) -> String {
    // Specifiers and variable expansion apply inside quotes too.
    let escaped = arg.replace('%', "%%").replace('$', "$$");
    let needs_quotes = escaped.is_empty()
        || escaped
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\' | ';'));
    if !needs_quotes {
        return escaped;
    }

    let mut quoted = String::with_capacity(escaped.len() + 2);
    quoted.push('"');
    for c in escaped.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}
