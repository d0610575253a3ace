//! RcloneRunner against a stand-in shell script.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use bisyncd_core::{SyncMode, SyncTarget};
use bisyncd_sync::{RcloneRunner, SyncError, SyncRunner, BISYNC_FLAGS};
use tempfile::TempDir;

fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-rclone");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
    path
}

#[test]
fn successful_run_passes_full_argument_profile() {
    let bin = TempDir::new().expect("bin");
    let local = TempDir::new().expect("local");
    let log = bin.path().join("argv.log");
    let script = write_script(
        bin.path(),
        &format!("printf '%s\\n' \"$@\" > '{}'\necho synced", log.display()),
    );

    let target = SyncTarget::new(local.path(), "remote:bucket").expect("target");
    let output = RcloneRunner::new(&script)
        .run(&target, SyncMode::Resync)
        .expect("run");
    assert_eq!(output.output, "synced");

    let argv: Vec<String> = fs::read_to_string(&log)
        .expect("argv log")
        .lines()
        .map(str::to_string)
        .collect();
    let mut expected = vec![
        "bisync".to_string(),
        target.local().display().to_string(),
        "remote:bucket".to_string(),
    ];
    expected.extend(BISYNC_FLAGS.iter().map(|f| f.to_string()));
    expected.push("--resync".to_string());
    assert_eq!(argv, expected);
}

#[test]
fn non_zero_exit_reports_status_and_combined_output() {
    let bin = TempDir::new().expect("bin");
    let local = TempDir::new().expect("local");
    let script = write_script(bin.path(), "echo partial\necho 'bisync aborted' >&2\nexit 2");

    let target = SyncTarget::new(local.path(), "remote:").expect("target");
    let err = RcloneRunner::new(&script)
        .run(&target, SyncMode::Incremental)
        .unwrap_err();

    match &err {
        SyncError::Failed { status, output } => {
            assert_eq!(status.code(), Some(2));
            assert_eq!(output, "partial\nbisync aborted");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.output(), Some("partial\nbisync aborted"));
}

#[test]
fn missing_program_is_a_spawn_error() {
    let local = TempDir::new().expect("local");
    let target = SyncTarget::new(local.path(), "remote:").expect("target");
    let err = RcloneRunner::new("/nonexistent/rclone-for-tests")
        .run(&target, SyncMode::Incremental)
        .unwrap_err();
    assert!(matches!(err, SyncError::Spawn { .. }), "got: {err}");
    assert!(err.output().is_none());
}
