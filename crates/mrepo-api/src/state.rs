//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! The repository does blocking filesystem I/O. Handlers reach it through
//! [`AppState::with_repo`], which moves the call onto Tokio's blocking pool.

use std::path::PathBuf;
use std::sync::Arc;

use mrepo_store::{CatalogStatus, FileRepository, FileSource, FilesystemSource, RepoError};

use crate::error::AppError;

/// Server configuration.
///
/// Custom `Debug` redacts both secrets.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Root directory of the munki repository.
    pub repo_path: PathBuf,
    /// Bearer token for `/api/*`. If `None`, the API is unauthenticated.
    pub api_token: Option<String>,
    /// Basic-auth password for `/repo/*`. If `None`, files are served openly.
    pub repo_password: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("repo_path", &self.repo_path)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field(
                "repo_password",
                &self.repo_password.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            repo_path: PathBuf::from("repo"),
            api_token: None,
            repo_password: None,
        }
    }
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Record and package storage.
    pub repo: FileRepository,
    /// Backing store for the raw `/repo/` endpoint.
    pub files: Arc<dyn FileSource>,
    /// Progress of the catalog builder, if one is running.
    pub catalogs: Arc<CatalogStatus>,
    /// Server configuration.
    pub config: AppConfig,
}

impl AppState {
    /// State serving raw files from the repository's own root.
    pub fn new(config: AppConfig, repo: FileRepository, catalogs: Arc<CatalogStatus>) -> Self {
        let files = Arc::new(FilesystemSource::new(repo.root()));
        Self {
            repo,
            files,
            catalogs,
            config,
        }
    }

    /// Replace the raw file backend.
    pub fn with_file_source(mut self, files: Arc<dyn FileSource>) -> Self {
        self.files = files;
        self
    }

    /// Run a repository operation on the blocking pool.
    pub async fn with_repo<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&FileRepository) -> Result<T, RepoError> + Send + 'static,
        T: Send + 'static,
    {
        let repo = self.repo.clone();
        let result = tokio::task::spawn_blocking(move || op(&repo))
            .await
            .map_err(|e| AppError::Internal(format!("repository task failed: {e}")))?;
        Ok(result?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secrets() {
        let config = AppConfig {
            api_token: Some("api-secret".to_string()),
            repo_password: Some("repo-secret".to_string()),
            ..Default::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("api-secret"));
        assert!(!rendered.contains("repo-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn default_config_has_no_credentials() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8080);
        assert!(config.api_token.is_none());
        assert!(config.repo_password.is_none());
    }

    #[tokio::test]
    async fn with_repo_maps_store_errors() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileRepository::new(dir.path());
        let state = AppState::new(AppConfig::default(), repo, Arc::default());
        let err = state
            .with_repo(|repo| repo.get_manifest("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
