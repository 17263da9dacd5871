//! # Repository Records
//!
//! The [`Record`] trait is the seam between the typed record layer and the
//! storage layer. Both record kinds share the same identity rules: the
//! `filename` is the `/`-separated path of the record below its kind
//! directory, is assigned by the repository, and is never part of the
//! serialized body.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The two persisted record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// A client manifest, stored under `manifests/`.
    Manifest,
    /// A package descriptor, stored under `pkgsinfo/`.
    Pkgsinfo,
}

impl RecordKind {
    /// Name of the repository subdirectory holding records of this kind.
    pub fn dir(&self) -> &'static str {
        match self {
            Self::Manifest => "manifests",
            Self::Pkgsinfo => "pkgsinfo",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manifest => f.write_str("manifest"),
            Self::Pkgsinfo => f.write_str("pkgsinfo"),
        }
    }
}

/// A metadata record persisted by the repository.
pub trait Record:
    Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static
{
    /// Which subtree of the repository this record lives in.
    const KIND: RecordKind;

    /// The record identity.
    fn filename(&self) -> &str;

    /// Assign the record identity.
    fn set_filename(&mut self, filename: String);

    /// Required-field checks performed before persisting.
    fn validate(&self) -> Result<(), ValidationError> {
        if self.filename().is_empty() {
            return Err(ValidationError::MissingFilename);
        }
        Ok(())
    }

    /// An empty record carrying only its identity.
    fn shell(filename: &str) -> Self {
        let mut record = Self::default();
        record.set_filename(filename.to_string());
        record
    }
}

/// The `filename` key of a submitted create payload.
///
/// Record bodies never carry their identity, so create requests are decoded
/// twice: once into the record and once into this struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FilenameField {
    /// The requested identity, if the payload carried one.
    #[serde(default)]
    pub filename: Option<String>,
}

impl FilenameField {
    /// The filename, with an empty string standing in for a missing key.
    pub fn into_filename(self) -> String {
        self.filename.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;
    use crate::pkgsinfo::PkgsInfo;

    #[test]
    fn kind_directories() {
        assert_eq!(RecordKind::Manifest.dir(), "manifests");
        assert_eq!(RecordKind::Pkgsinfo.dir(), "pkgsinfo");
        assert_eq!(Manifest::KIND, RecordKind::Manifest);
        assert_eq!(PkgsInfo::KIND, RecordKind::Pkgsinfo);
    }

    #[test]
    fn shell_sets_identity_only() {
        let m = Manifest::shell("site_default");
        assert_eq!(m.filename(), "site_default");
        assert!(m.catalogs.is_empty());
        assert!(m.validate().is_ok());
    }

    #[test]
    fn empty_identity_fails_validation() {
        assert_eq!(
            PkgsInfo::default().validate(),
            Err(ValidationError::MissingFilename)
        );
    }

    #[test]
    fn filename_field_defaults_to_empty() {
        let f: FilenameField = serde_json::from_str("{\"name\": \"Firefox\"}").unwrap();
        assert_eq!(f.into_filename(), "");
        let f: FilenameField = serde_json::from_str("{\"filename\": \"a/b.plist\"}").unwrap();
        assert_eq!(f.into_filename(), "a/b.plist");
    }
}
