//! # Repository Errors
//!
//! Every repository operation returns [`RepoError`]. The variants carry
//! enough context for the transport layer to choose a status code without
//! inspecting messages.

use std::path::PathBuf;

use mrepo_core::{CodecError, ValidationError};
use thiserror::Error;

/// Errors raised by the filesystem repository.
#[derive(Error, Debug)]
pub enum RepoError {
    /// The named item does not exist.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// What was looked up ("manifest", "pkgsinfo", "pkg", ...).
        kind: &'static str,
        /// The requested identity.
        name: String,
    },

    /// Create was called for an identity that is already taken.
    #[error("{kind} already exists: {name}")]
    AlreadyExists {
        /// What was being created.
        kind: &'static str,
        /// The requested identity.
        name: String,
    },

    /// The identity would resolve outside its repository subtree, or is
    /// otherwise not a plain relative path.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath {
        /// The rejected identity.
        path: String,
        /// Which rule it broke.
        reason: &'static str,
    },

    /// A required field is missing.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A record could not be encoded for storage.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// An underlying filesystem operation failed.
    #[error("i/o error at {}: {source}", path.display())]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The OS error.
        #[source]
        source: std::io::Error,
    },
}

impl RepoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn not_found(kind: &'static str, name: &str) -> Self {
        Self::NotFound {
            kind,
            name: name.to_string(),
        }
    }

    pub(crate) fn already_exists(kind: &'static str, name: &str) -> Self {
        Self::AlreadyExists {
            kind,
            name: name.to_string(),
        }
    }

    /// Whether this is a [`RepoError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
