//! # Filesystem Repository
//!
//! Persists manifests and pkgsinfos as plist files and package binaries as
//! opaque files under a single root directory.
//!
//! ## Semantics
//!
//! - **List** walks the whole subtree on every call. Files that fail to
//!   decode are logged and skipped; hidden files are ignored; a missing
//!   subtree lists as empty.
//! - **Get** is a full list followed by an index lookup. Nothing is cached.
//! - **Create** reserves an identity by writing an empty placeholder and
//!   returns an empty record carrying that identity.
//! - **Save** requires the placeholder to exist and replaces it atomically.
//! - **Delete** reports [`RepoError::NotFound`] only when the file is
//!   missing; any other failure surfaces as [`RepoError::Io`].
//!
//! Saving or deleting a pkgsinfo asks the catalog builder for a rebuild.
//! The repository holds no locks; concurrent writers to the same identity
//! resolve as last write wins.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use mrepo_core::codec::{decode, encode};
use mrepo_core::{
    CatalogEntry, Collection, Manifest, ManifestCollection, MediaType, PkgsInfo,
    PkgsInfoCollection, Record, RecordKind,
};
use serde::Serialize;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::catalog::{self, CatalogBuilder, CatalogTrigger};
use crate::error::RepoError;
use crate::layout::{write_atomic, Area, RepoLayout};

/// Receipt returned after storing a package binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PkgReceipt {
    /// Identity below `pkgs/`.
    pub filename: String,
    /// Bytes written.
    pub size: u64,
    /// Lowercase hex SHA-256 of the content, suitable for
    /// `installer_item_hash`.
    pub sha256: String,
}

/// A munki repository rooted at a directory.
///
/// Cloning is cheap; clones share the catalog trigger.
#[derive(Debug, Clone)]
pub struct FileRepository {
    layout: RepoLayout,
    trigger: Option<CatalogTrigger>,
}

impl FileRepository {
    /// A repository without a catalog builder. Pkgsinfo writes do not
    /// regenerate catalogs.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            layout: RepoLayout::new(root),
            trigger: None,
        }
    }

    /// A repository wired to a catalog builder.
    ///
    /// The returned [`CatalogBuilder`] does nothing until its
    /// [`run`](CatalogBuilder::run) future is spawned. Dropping every clone of
    /// the repository closes the channel and ends the worker.
    pub fn with_catalog_builder(root: impl Into<PathBuf>) -> (Self, CatalogBuilder) {
        let layout = RepoLayout::new(root);
        let builder_repo = Self {
            layout: layout.clone(),
            trigger: None,
        };
        let (trigger, builder) = catalog::channel(builder_repo);
        let repo = Self {
            layout,
            trigger: Some(trigger),
        };
        (repo, builder)
    }

    /// The path layout of this repository.
    pub fn layout(&self) -> &RepoLayout {
        &self.layout
    }

    /// The repository root.
    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    fn request_rebuild(&self) {
        if let Some(trigger) = &self.trigger {
            trigger.request();
        }
    }

    // -----------------------------------------------------------------------
    // Generic record operations
    // -----------------------------------------------------------------------

    /// Every decodable record of kind `R`, in lexical path order.
    pub fn list<R: Record>(&self) -> Result<Collection<R>, RepoError> {
        let dir = self.layout.area_dir(R::KIND.into());
        if !dir.is_dir() {
            return Ok(Collection::default());
        }

        let walker = WalkDir::new(&dir)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e.file_name()));

        let mut records = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir.as_path()).to_path_buf();
                RepoError::io(path, io::Error::from(e))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(identity) = identity_of(&dir, entry.path()) else {
                tracing::warn!(path = %entry.path().display(), "skipping non-UTF-8 path");
                continue;
            };
            let bytes = fs::read(entry.path()).map_err(|e| RepoError::io(entry.path(), e))?;
            match decode::<R>(&bytes, MediaType::Plist) {
                Ok(mut record) => {
                    record.set_filename(identity);
                    records.push(record);
                }
                Err(e) => {
                    tracing::warn!(
                        kind = %R::KIND,
                        filename = %identity,
                        error = %e,
                        "skipping undecodable record"
                    );
                }
            }
        }
        Ok(Collection::new(records))
    }

    /// The record named `name`.
    pub fn get<R: Record>(&self, name: &str) -> Result<R, RepoError> {
        let area = Area::from(R::KIND);
        self.layout.resolve(area, name)?;
        self.list::<R>()?
            .index()
            .take(name)
            .ok_or_else(|| RepoError::not_found(area.noun(), name))
    }

    /// Reserve `name` and return an empty record carrying it.
    pub fn create<R: Record>(&self, name: &str) -> Result<R, RepoError> {
        let area = Area::from(R::KIND);
        let path = self.layout.resolve(area, name)?;
        if path.exists() {
            return Err(RepoError::already_exists(area.noun(), name));
        }
        create_parent(&path)?;
        create_new_file(&path, &[]).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => RepoError::already_exists(area.noun(), name),
            _ => RepoError::io(&path, e),
        })?;
        Ok(R::shell(name))
    }

    /// Encode `record` as plist and replace its file.
    pub fn save<R: Record>(&self, record: &R) -> Result<(), RepoError> {
        record.validate()?;
        let area = Area::from(R::KIND);
        let name = record.filename();
        let path = self.layout.resolve(area, name)?;
        if !path.is_file() {
            return Err(RepoError::not_found(area.noun(), name));
        }

        let bytes = encode(record, MediaType::Plist)?;
        write_atomic(&path, &bytes).map_err(|e| RepoError::io(&path, e))?;

        if R::KIND == RecordKind::Pkgsinfo {
            self.request_rebuild();
        }
        Ok(())
    }

    /// Remove the record named `name`.
    pub fn delete<R: Record>(&self, name: &str) -> Result<(), RepoError> {
        let area = Area::from(R::KIND);
        let path = self.layout.resolve(area, name)?;
        remove_file(&path, area, name)?;

        if R::KIND == RecordKind::Pkgsinfo {
            self.request_rebuild();
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Manifests
    // -----------------------------------------------------------------------

    /// Every manifest in the repository.
    pub fn list_manifests(&self) -> Result<ManifestCollection, RepoError> {
        self.list()
    }

    /// One manifest by identity.
    pub fn get_manifest(&self, name: &str) -> Result<Manifest, RepoError> {
        self.get(name)
    }

    /// Reserve a manifest identity.
    pub fn create_manifest(&self, name: &str) -> Result<Manifest, RepoError> {
        self.create(name)
    }

    /// Persist a manifest.
    pub fn save_manifest(&self, manifest: &Manifest) -> Result<(), RepoError> {
        self.save(manifest)
    }

    /// Remove a manifest.
    pub fn delete_manifest(&self, name: &str) -> Result<(), RepoError> {
        self.delete::<Manifest>(name)
    }

    // -----------------------------------------------------------------------
    // Pkgsinfo
    // -----------------------------------------------------------------------

    /// Every pkgsinfo in the repository.
    pub fn list_pkgsinfos(&self) -> Result<PkgsInfoCollection, RepoError> {
        self.list()
    }

    /// One pkgsinfo by identity.
    pub fn get_pkgsinfo(&self, name: &str) -> Result<PkgsInfo, RepoError> {
        self.get(name)
    }

    /// Reserve a pkgsinfo identity.
    pub fn create_pkgsinfo(&self, name: &str) -> Result<PkgsInfo, RepoError> {
        self.create(name)
    }

    /// Persist a pkgsinfo and request a catalog rebuild.
    pub fn save_pkgsinfo(&self, info: &PkgsInfo) -> Result<(), RepoError> {
        self.save(info)
    }

    /// Remove a pkgsinfo and request a catalog rebuild.
    pub fn delete_pkgsinfo(&self, name: &str) -> Result<(), RepoError> {
        self.delete::<PkgsInfo>(name)
    }

    // -----------------------------------------------------------------------
    // Package binaries
    // -----------------------------------------------------------------------

    /// Store the bytes from `reader` under `pkgs/<name>`.
    ///
    /// Fails with [`RepoError::AlreadyExists`] rather than overwrite. A failed
    /// copy removes the partial file.
    pub fn add_pkg(&self, name: &str, mut reader: impl Read) -> Result<PkgReceipt, RepoError> {
        let area = Area::Pkgs;
        let path = self.layout.resolve(area, name)?;
        if path.exists() {
            return Err(RepoError::already_exists(area.noun(), name));
        }
        create_parent(&path)?;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => RepoError::already_exists(area.noun(), name),
                _ => RepoError::io(&path, e),
            })?;

        let (size, digest) = match copy_hashed(&mut reader, &mut file) {
            Ok(done) => done,
            Err(e) => {
                drop(file);
                let _ = fs::remove_file(&path);
                return Err(RepoError::io(&path, e));
            }
        };

        let sha256: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        tracing::info!(filename = %name, size, "stored package");
        Ok(PkgReceipt {
            filename: name.to_string(),
            size,
            sha256,
        })
    }

    /// Remove a package binary.
    pub fn delete_pkg(&self, name: &str) -> Result<(), RepoError> {
        let path = self.layout.resolve(Area::Pkgs, name)?;
        remove_file(&path, Area::Pkgs, name)
    }

    // -----------------------------------------------------------------------
    // Catalogs (derived)
    // -----------------------------------------------------------------------

    /// Names of the catalog files currently on disk, sorted.
    pub fn list_catalogs(&self) -> Result<Vec<String>, RepoError> {
        let dir = self.layout.area_dir(Area::Catalogs);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RepoError::io(&dir, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| RepoError::io(&dir, e))?;
            let is_file = entry
                .file_type()
                .map_err(|e| RepoError::io(entry.path(), e))?
                .is_file();
            let name = entry.file_name();
            if !is_file || is_hidden(&name) {
                continue;
            }
            if let Some(name) = name.to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// The entries of one catalog as last written by the builder.
    pub fn get_catalog(&self, name: &str) -> Result<Vec<CatalogEntry>, RepoError> {
        let path = self.layout.resolve_catalog(name)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(RepoError::not_found(Area::Catalogs.noun(), name))
            }
            Err(e) => return Err(RepoError::io(&path, e)),
        };
        Ok(decode(&bytes, MediaType::Plist)?)
    }

    pub(crate) fn write_catalog(
        &self,
        name: &str,
        entries: &[CatalogEntry],
    ) -> Result<(), RepoError> {
        let path = self.layout.resolve_catalog(name)?;
        create_parent(&path)?;
        let bytes = encode(&entries, MediaType::Plist)?;
        write_atomic(&path, &bytes).map_err(|e| RepoError::io(&path, e))
    }

    pub(crate) fn remove_catalog(&self, name: &str) -> Result<(), RepoError> {
        let path = self.layout.resolve_catalog(name)?;
        remove_file(&path, Area::Catalogs, name)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}

/// `/`-joined path of `path` relative to `dir`.
fn identity_of(dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(dir).ok()?;
    let segments: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
    Some(segments?.join("/"))
}

/// Copy `reader` into `file`, returning the byte count and SHA-256 digest.
fn copy_hashed(reader: &mut impl Read, file: &mut fs::File) -> io::Result<(u64, Vec<u8>)> {
    let mut hasher = Sha256::new();
    let mut size = 0u64;
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
        file.write_all(&buf[..n])?;
        size += n as u64;
    }
    file.flush()?;
    Ok((size, hasher.finalize().to_vec()))
}

fn create_parent(path: &Path) -> Result<(), RepoError> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent).map_err(|e| RepoError::io(parent, e)),
        None => Ok(()),
    }
}

fn create_new_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    file.write_all(bytes)
}

fn remove_file(path: &Path, area: Area, name: &str) -> Result<(), RepoError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(RepoError::not_found(area.noun(), name)),
        Err(e) => Err(RepoError::io(path, e)),
    }
}
