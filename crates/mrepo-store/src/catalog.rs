//! # Catalog Builder
//!
//! Catalogs are derived files: one plist array per catalog name referenced
//! by any pkgsinfo, plus the synthetic `all` catalog. They are regenerated
//! in full whenever a pkgsinfo is saved or deleted.
//!
//! ## Coalescing
//!
//! Writers signal through a capacity-1 channel with a non-blocking send. If a
//! signal is already pending, the new one is dropped: the pending rebuild has
//! not started yet and will observe the newer write. A burst of N writes
//! therefore produces between one and N rebuilds, and the last rebuild always
//! starts after the last write.
//!
//! One worker task drains the channel. Rebuilds run on the blocking pool.
//! There is no completion notification for writers; [`CatalogStatus`] exists
//! for observability.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use mrepo_core::ALL_CATALOG;
use tokio::sync::mpsc;

use crate::error::RepoError;
use crate::repo::FileRepository;

/// What the builder worker is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogState {
    /// Waiting for a signal.
    Idle,
    /// A rebuild pass is in progress.
    Rebuilding,
}

/// Shared view of the builder's progress.
#[derive(Debug, Default)]
pub struct CatalogStatus {
    state: AtomicU8,
    generation: AtomicU64,
}

impl CatalogStatus {
    const IDLE: u8 = 0;
    const REBUILDING: u8 = 1;

    /// Current worker state.
    pub fn state(&self) -> CatalogState {
        match self.state.load(Ordering::Acquire) {
            Self::REBUILDING => CatalogState::Rebuilding,
            _ => CatalogState::Idle,
        }
    }

    /// Number of rebuild passes completed since startup.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn begin(&self) {
        self.state.store(Self::REBUILDING, Ordering::Release);
    }

    fn finish(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.state.store(Self::IDLE, Ordering::Release);
    }
}

/// Sending half of the rebuild channel, owned by the repository.
#[derive(Debug, Clone)]
pub struct CatalogTrigger {
    tx: mpsc::Sender<()>,
}

impl CatalogTrigger {
    /// Ask for a rebuild without blocking.
    ///
    /// Returns `false` when the request was coalesced into one already
    /// pending, or when the worker has shut down.
    pub fn request(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(())) => {
                tracing::debug!("catalog rebuild already pending");
                false
            }
            Err(mpsc::error::TrySendError::Closed(())) => {
                tracing::debug!("catalog builder is not running");
                false
            }
        }
    }
}

/// Summary of one rebuild pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// Pkgsinfo records read.
    pub pkgsinfos: usize,
    /// Catalog files written, including `all`.
    pub written: Vec<String>,
    /// Catalogs that failed to save.
    pub failed: Vec<String>,
    /// Stale catalog files removed.
    pub removed: Vec<String>,
}

/// Receiving half of the rebuild channel plus the worker loop.
#[derive(Debug)]
pub struct CatalogBuilder {
    repo: FileRepository,
    rx: mpsc::Receiver<()>,
    status: Arc<CatalogStatus>,
}

pub(crate) fn channel(repo: FileRepository) -> (CatalogTrigger, CatalogBuilder) {
    let (tx, rx) = mpsc::channel(1);
    let builder = CatalogBuilder {
        repo,
        rx,
        status: Arc::new(CatalogStatus::default()),
    };
    (CatalogTrigger { tx }, builder)
}

impl CatalogBuilder {
    /// Shared status handle. Clone it before spawning [`run`](Self::run).
    pub fn status(&self) -> Arc<CatalogStatus> {
        Arc::clone(&self.status)
    }

    /// Run one rebuild pass on the calling thread.
    pub fn rebuild_now(&self) -> Result<RebuildReport, RepoError> {
        self.status.begin();
        let result = rebuild_catalogs(&self.repo);
        self.status.finish();
        result
    }

    /// Drain rebuild signals until every trigger has been dropped.
    pub async fn run(mut self) {
        while self.rx.recv().await.is_some() {
            self.status.begin();
            let repo = self.repo.clone();
            match tokio::task::spawn_blocking(move || rebuild_catalogs(&repo)).await {
                Ok(Ok(report)) => {
                    tracing::info!(
                        pkgsinfos = report.pkgsinfos,
                        catalogs = report.written.len(),
                        failed = report.failed.len(),
                        "rebuilt catalogs"
                    );
                }
                Ok(Err(e)) => tracing::error!(error = %e, "catalog rebuild failed"),
                Err(e) => tracing::error!(error = %e, "catalog rebuild task panicked"),
            }
            self.status.finish();
        }
        tracing::debug!("catalog trigger closed; builder exiting");
    }
}

/// Regenerate every catalog from the current pkgsinfos.
///
/// A catalog that fails to save is logged and skipped; the pass continues.
/// Catalog files whose name no longer appears in any pkgsinfo are removed.
pub fn rebuild_catalogs(repo: &FileRepository) -> Result<RebuildReport, RepoError> {
    let infos = repo.list_pkgsinfos()?;
    let names: Vec<String> = std::iter::once(ALL_CATALOG.to_string())
        .chain(infos.catalog_names().into_iter().filter(|n| n != ALL_CATALOG))
        .collect();

    let mut report = RebuildReport {
        pkgsinfos: infos.len(),
        ..Default::default()
    };

    for name in &names {
        let entries = infos.catalog(name);
        match repo.write_catalog(name, &entries) {
            Ok(()) => report.written.push(name.clone()),
            Err(e) => {
                tracing::warn!(catalog = %name, error = %e, "failed to save catalog");
                report.failed.push(name.clone());
            }
        }
    }

    for existing in repo.list_catalogs()? {
        if names.contains(&existing) {
            continue;
        }
        match repo.remove_catalog(&existing) {
            Ok(()) => report.removed.push(existing),
            Err(e) => tracing::warn!(catalog = %existing, error = %e, "failed to remove stale catalog"),
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_starts_idle_at_generation_zero() {
        let status = CatalogStatus::default();
        assert_eq!(status.state(), CatalogState::Idle);
        assert_eq!(status.generation(), 0);
    }

    #[test]
    fn status_tracks_passes() {
        let status = CatalogStatus::default();
        status.begin();
        assert_eq!(status.state(), CatalogState::Rebuilding);
        status.finish();
        assert_eq!(status.state(), CatalogState::Idle);
        assert_eq!(status.generation(), 1);
    }

    #[test]
    fn second_request_coalesces_while_pending() {
        let dir = tempfile::tempdir().unwrap();
        let (trigger, _builder) = channel(FileRepository::new(dir.path()));
        assert!(trigger.request());
        assert!(!trigger.request());
        assert!(!trigger.request());
    }

    #[test]
    fn request_after_signal_taken_is_queued() {
        let dir = tempfile::tempdir().unwrap();
        let (trigger, mut builder) = channel(FileRepository::new(dir.path()));
        assert!(trigger.request());
        assert!(builder.rx.try_recv().is_ok());
        // The worker is now rebuilding; a new write must queue another pass.
        assert!(trigger.request());
        assert!(builder.rx.try_recv().is_ok());
    }

    #[test]
    fn request_after_builder_dropped_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let (trigger, builder) = channel(FileRepository::new(dir.path()));
        drop(builder);
        assert!(!trigger.request());
    }

    #[test]
    fn empty_repository_writes_only_all() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileRepository::new(dir.path());
        let report = rebuild_catalogs(&repo).unwrap();
        assert_eq!(report.written, vec![ALL_CATALOG.to_string()]);
        assert!(repo.get_catalog(ALL_CATALOG).unwrap().is_empty());
    }
}
