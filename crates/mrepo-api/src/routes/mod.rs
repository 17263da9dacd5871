//! # Route Modules
//!
//! One module per repository area. Each exposes a `router()` that the
//! top-level [`app`](crate::app) merges behind the appropriate auth layer.

pub mod catalogs;
pub mod health;
pub mod manifests;
pub mod pkgs;
pub mod pkgsinfo;
pub mod repo_files;

use mrepo_core::Record;
use mrepo_store::{FileRepository, RepoError};

/// Reserve `record`'s identity and write it.
///
/// If the write fails after the identity was reserved, the placeholder is
/// removed so the name can be retried.
pub(crate) fn create_record<R: Record>(repo: &FileRepository, record: R) -> Result<R, RepoError> {
    let name = record.filename().to_string();
    repo.create::<R>(&name)?;
    if let Err(e) = repo.save(&record) {
        if let Err(cleanup) = repo.delete::<R>(&name) {
            tracing::warn!(kind = %R::KIND, name = %name, error = %cleanup, "failed to remove placeholder");
        }
        return Err(e);
    }
    Ok(record)
}
