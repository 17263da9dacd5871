//! # mrepo-store: Filesystem Repository
//!
//! Storage for a munki repository: a directory tree of plist records and
//! package binaries, with catalogs derived from the pkgsinfo records.
//!
//! ## Modules
//!
//! - [`layout`]: identity-to-path mapping and path safety checks.
//! - [`repo`]: [`FileRepository`] CRUD over manifests, pkgsinfos, and pkgs.
//! - [`catalog`]: the coalescing [`CatalogBuilder`] worker.
//! - [`source`]: the [`FileSource`] capability behind raw file serving.
//!
//! ## Wiring
//!
//! ```ignore
//! let (repo, builder) = FileRepository::with_catalog_builder("/srv/munki");
//! let status = builder.status();
//! tokio::spawn(builder.run());
//! repo.save_pkgsinfo(&info)?; // schedules a catalog rebuild
//! ```

pub mod catalog;
pub mod error;
pub mod layout;
pub mod repo;
pub mod source;

pub use catalog::{
    rebuild_catalogs, CatalogBuilder, CatalogState, CatalogStatus, CatalogTrigger, RebuildReport,
};
pub use error::RepoError;
pub use layout::{check_identity, Area, RepoLayout};
pub use repo::{FileRepository, PkgReceipt};
pub use source::{FileSource, FilesystemSource};
