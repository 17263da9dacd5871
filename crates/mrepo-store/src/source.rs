//! # File Sources
//!
//! The raw `/repo/` endpoint serves repository files to clients by path.
//! [`FileSource`] is the capability it needs; object-store backends would
//! implement the same trait. [`FilesystemSource`] serves from the local
//! repository root.

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::error::RepoError;
use crate::layout::RepoLayout;

/// Read a repository file by its path relative to the repository root.
pub trait FileSource: Send + Sync + std::fmt::Debug {
    /// The full content of `path`, e.g. `catalogs/all` or `pkgs/apps/x.dmg`.
    fn read(&self, path: &str) -> Result<Vec<u8>, RepoError>;

    /// Whether the backing store is reachable.
    fn healthy(&self) -> bool;
}

/// Serves files from a local repository directory.
#[derive(Debug, Clone)]
pub struct FilesystemSource {
    layout: RepoLayout,
}

impl FilesystemSource {
    /// Serve files below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            layout: RepoLayout::new(root),
        }
    }
}

impl FileSource for FilesystemSource {
    fn read(&self, path: &str) -> Result<Vec<u8>, RepoError> {
        let full = self.layout.resolve_relative(path)?;
        let not_found = || RepoError::NotFound {
            kind: "file",
            name: path.to_string(),
        };
        match fs::metadata(&full) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(not_found()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(RepoError::io(&full, e)),
        }
        fs::read(&full).map_err(|e| RepoError::io(&full, e))
    }

    fn healthy(&self) -> bool {
        self.layout.root().is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_files_below_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("catalogs")).unwrap();
        fs::write(dir.path().join("catalogs/all"), b"<plist/>").unwrap();

        let source = FilesystemSource::new(dir.path());
        assert_eq!(source.read("catalogs/all").unwrap(), b"<plist/>");
        assert!(source.healthy());
    }

    #[test]
    fn directories_and_missing_files_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("pkgs")).unwrap();

        let source = FilesystemSource::new(dir.path());
        assert!(source.read("pkgs").unwrap_err().is_not_found());
        assert!(source.read("pkgs/missing.dmg").unwrap_err().is_not_found());
    }

    #[test]
    fn traversal_is_rejected_before_io() {
        let dir = tempfile::tempdir().unwrap();
        let source = FilesystemSource::new(dir.path().join("repo"));
        let err = source.read("../secret").unwrap_err();
        assert!(matches!(err, RepoError::InvalidPath { .. }));
    }

    #[test]
    fn missing_root_is_unhealthy() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!FilesystemSource::new(dir.path().join("nope")).healthy());
    }
}
