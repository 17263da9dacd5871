//! # Repository Layout
//!
//! Maps identities to paths under the repository root:
//!
//! ```text
//! <root>/manifests/<name>          plist Manifest
//! <root>/pkgsinfo/<relative-path>  plist PkgsInfo
//! <root>/pkgs/<relative-path>      opaque binary
//! <root>/catalogs/<name>           plist array of catalog entries
//! ```
//!
//! ## Path Safety
//!
//! Identities come straight from request paths and bodies. Before any I/O
//! an identity must be a `/`-separated relative path whose segments are all
//! plain names: no empty segments, no `.` or `..`, no leading dot, no NUL.
//! Anything else is rejected with [`RepoError::InvalidPath`], so a resolved
//! path can never leave its area directory.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use mrepo_core::RecordKind;
use uuid::Uuid;

use crate::error::RepoError;

/// One of the fixed subdirectories of a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Area {
    /// `manifests/`
    Manifests,
    /// `pkgsinfo/`
    Pkgsinfo,
    /// `pkgs/`
    Pkgs,
    /// `catalogs/`
    Catalogs,
}

impl Area {
    /// Directory name below the repository root.
    pub fn dir(&self) -> &'static str {
        match self {
            Self::Manifests => "manifests",
            Self::Pkgsinfo => "pkgsinfo",
            Self::Pkgs => "pkgs",
            Self::Catalogs => "catalogs",
        }
    }

    /// Noun used in error messages.
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Manifests => "manifest",
            Self::Pkgsinfo => "pkgsinfo",
            Self::Pkgs => "pkg",
            Self::Catalogs => "catalog",
        }
    }
}

impl From<RecordKind> for Area {
    fn from(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Manifest => Self::Manifests,
            RecordKind::Pkgsinfo => Self::Pkgsinfo,
        }
    }
}

/// Resolves identities to filesystem paths below a repository root.
#[derive(Debug, Clone)]
pub struct RepoLayout {
    root: PathBuf,
}

impl RepoLayout {
    /// Layout rooted at `root`. The directory does not need to exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The repository root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory of one area.
    pub fn area_dir(&self, area: Area) -> PathBuf {
        self.root.join(area.dir())
    }

    /// Validate `identity` and join it onto the area directory.
    pub fn resolve(&self, area: Area, identity: &str) -> Result<PathBuf, RepoError> {
        check_identity(identity)?;
        let mut path = self.area_dir(area);
        for segment in identity.split('/') {
            path.push(segment);
        }
        Ok(path)
    }

    /// Validate a catalog name and join it onto `catalogs/`.
    ///
    /// Catalogs live flat in their directory, so a name must be a single
    /// path segment.
    pub fn resolve_catalog(&self, name: &str) -> Result<PathBuf, RepoError> {
        check_identity(name)?;
        if name.contains('/') {
            return Err(RepoError::InvalidPath {
                path: name.to_string(),
                reason: "catalog names cannot contain a path separator",
            });
        }
        Ok(self.area_dir(Area::Catalogs).join(name))
    }

    /// Validate a path relative to the repository root, as served by the
    /// raw file endpoint (`manifests/site_default`, `pkgs/apps/x.dmg`).
    pub fn resolve_relative(&self, relative: &str) -> Result<PathBuf, RepoError> {
        check_identity(relative)?;
        Ok(self.root.join(relative))
    }
}

/// Reject identities that are not plain relative paths.
pub fn check_identity(identity: &str) -> Result<(), RepoError> {
    let invalid = |reason: &'static str| RepoError::InvalidPath {
        path: identity.to_string(),
        reason,
    };

    if identity.is_empty() {
        return Err(invalid("empty path"));
    }
    if identity.contains('\0') {
        return Err(invalid("contains NUL"));
    }
    if identity.contains('\\') {
        return Err(invalid("contains a backslash"));
    }
    for segment in identity.split('/') {
        match segment {
            "" => return Err(invalid("empty or absolute path segment")),
            "." | ".." => return Err(invalid("relative path segment")),
            s if s.starts_with('.') => return Err(invalid("hidden path segment")),
            _ => {}
        }
    }
    // Catches platform prefixes such as `C:` that splitting on `/` misses.
    if !Path::new(identity)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return Err(invalid("not a plain relative path"));
    }
    Ok(())
}

/// Replace `path` with `bytes` by writing a sibling temp file and renaming
/// it over the target. Readers see either the old or the new content.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = parent.join(format!(".{name}.{}.tmp", Uuid::new_v4()));

    fs::write(&tmp_path, bytes)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(identity: &str) -> &'static str {
        match check_identity(identity) {
            Err(RepoError::InvalidPath { reason, .. }) => reason,
            other => panic!("expected InvalidPath for {identity:?}, got {other:?}"),
        }
    }

    #[test]
    fn plain_paths_are_accepted() {
        assert!(check_identity("site_default").is_ok());
        assert!(check_identity("apps/Firefox-50.1.0.plist").is_ok());
        assert!(check_identity("a/b/c d.plist").is_ok());
    }

    #[test]
    fn traversal_is_rejected() {
        assert_eq!(reason(".."), "relative path segment");
        assert_eq!(reason("../etc/passwd"), "relative path segment");
        assert_eq!(reason("apps/../../x"), "relative path segment");
        assert_eq!(reason("./x"), "relative path segment");
    }

    #[test]
    fn absolute_and_empty_segments_are_rejected() {
        assert_eq!(reason(""), "empty path");
        assert_eq!(reason("/etc/passwd"), "empty or absolute path segment");
        assert_eq!(reason("a//b"), "empty or absolute path segment");
        assert_eq!(reason("a/"), "empty or absolute path segment");
    }

    #[test]
    fn hidden_and_odd_characters_are_rejected() {
        assert_eq!(reason(".hidden"), "hidden path segment");
        assert_eq!(reason("apps/.DS_Store"), "hidden path segment");
        assert_eq!(reason("a\0b"), "contains NUL");
        assert_eq!(reason("a\\b"), "contains a backslash");
    }

    #[test]
    fn resolve_stays_inside_area() {
        let layout = RepoLayout::new("/srv/repo");
        let path = layout.resolve(Area::Pkgsinfo, "apps/firefox.plist").unwrap();
        assert_eq!(path, PathBuf::from("/srv/repo/pkgsinfo/apps/firefox.plist"));
        assert!(layout.resolve(Area::Pkgs, "../manifests/x").is_err());
    }

    #[test]
    fn catalog_names_are_single_segments() {
        let layout = RepoLayout::new("/srv/repo");
        assert_eq!(
            layout.resolve_catalog("testing").unwrap(),
            PathBuf::from("/srv/repo/catalogs/testing")
        );
        match layout.resolve_catalog("team/beta") {
            Err(RepoError::InvalidPath { reason, .. }) => {
                assert_eq!(reason, "catalog names cannot contain a path separator")
            }
            other => panic!("expected InvalidPath, got {other:?}"),
        }
        assert!(layout.resolve_catalog("../escape").is_err());
    }

    #[test]
    fn area_from_record_kind() {
        assert_eq!(Area::from(RecordKind::Manifest), Area::Manifests);
        assert_eq!(Area::from(RecordKind::Pkgsinfo).dir(), "pkgsinfo");
    }

    #[test]
    fn atomic_write_replaces_content_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("catalog");
        fs::write(&target, b"old").unwrap();

        write_atomic(&target, b"new").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"new");
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
