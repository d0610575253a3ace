//! Startup validation as seen by callers of the public API.

use std::fs;

use bisyncd_core::{config, ConfigError, FileConfig, SyncTarget};

#[test]
fn empty_dir_argument_is_missing_argument() {
    let err = SyncTarget::new("", "remote:bucket").unwrap_err();
    assert!(matches!(err, ConfigError::MissingArgument("dir")), "got: {err}");
    assert_eq!(err.to_string(), "--dir is required");
}

#[test]
fn missing_directory_names_the_path() {
    let err = SyncTarget::new("/tmp/missing-dir-bisyncd-test", "remote:bucket").unwrap_err();
    assert!(matches!(err, ConfigError::DirectoryNotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("/tmp/missing-dir-bisyncd-test"));
}

#[test]
fn blank_remote_is_missing_argument() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let err = SyncTarget::new(dir.path(), "   ").unwrap_err();
    assert!(
        matches!(err, ConfigError::MissingArgument("remote-dir")),
        "got: {err}"
    );
}

#[test]
fn config_file_feeds_settings() {
    let home = tempfile::TempDir::new().expect("home");
    let path = config::config_path_at(home.path());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "sync_interval_secs: 0\n").unwrap();

    let file: FileConfig = config::load_at(home.path()).expect("load");
    let err = file.settings(None, None).unwrap_err();
    assert!(matches!(err, ConfigError::ZeroInterval), "got: {err}");
}
