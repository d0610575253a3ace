//! Mode-bit snapshots of the local tree.
//!
//! The poller only compares modification times, and `chmod` leaves those
//! alone. [`PermissionSnapshot`] is taken on the same cadence so permission
//! changes reach the coordinator too.

use std::collections::HashMap;
use std::fs::Metadata;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSnapshot {
    modes: HashMap<PathBuf, u32>,
}

impl PermissionSnapshot {
    /// Walk `root` without following symlinks. Entries that vanish or cannot
    /// be read mid-walk are left out.
    pub fn scan(root: &Path) -> Self {
        let modes = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let mode = mode_bits(&entry.metadata().ok()?);
                Some((entry.into_path(), mode))
            })
            .collect();
        Self { modes }
    }

    /// Paths present in both snapshots whose mode differs, sorted.
    ///
    /// Creations and removals are the poller's business and are not reported.
    pub fn changed_since(&self, previous: &Self) -> Vec<PathBuf> {
        let mut changed: Vec<PathBuf> = self
            .modes
            .iter()
            .filter(|(path, mode)| previous.modes.get(*path).is_some_and(|old| old != *mode))
            .map(|(path, _)| path.clone())
            .collect();
        changed.sort();
        changed
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

#[cfg(unix)]
fn mode_bits(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_bits(metadata: &Metadata) -> u32 {
    u32::from(metadata.permissions().readonly())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    #[test]
    fn scan_covers_root_and_nested_entries() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("a/b/file.txt"), b"x").unwrap();

        let snapshot = PermissionSnapshot::scan(dir.path());
        // root, a, a/b, a/b/file.txt
        assert_eq!(snapshot.len(), 4);
    }

    #[test]
    fn chmod_is_reported() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("secret.txt");
        fs::write(&file, b"x").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o644)).unwrap();
        let before = PermissionSnapshot::scan(dir.path());

        fs::set_permissions(&file, fs::Permissions::from_mode(0o600)).unwrap();
        let after = PermissionSnapshot::scan(dir.path());

        assert_eq!(after.changed_since(&before), vec![file]);
    }

    #[test]
    fn content_writes_and_new_files_are_not_permission_changes() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, b"one").unwrap();
        let before = PermissionSnapshot::scan(dir.path());

        fs::write(&file, b"two").unwrap();
        fs::write(dir.path().join("new.txt"), b"new").unwrap();
        let after = PermissionSnapshot::scan(dir.path());

        assert!(after.changed_since(&before).is_empty());
    }

    #[test]
    fn missing_root_scans_empty() {
        let dir = TempDir::new().unwrap();
        let snapshot = PermissionSnapshot::scan(&dir.path().join("gone"));
        assert!(snapshot.is_empty());
    }
}
