//! # Manifests
//!
//! A manifest tells a client which catalogs to search and which items to
//! install, update, or remove. Manifests may include other manifests and
//! carry conditional item sets that apply only when a predicate holds.

use serde::{Deserialize, Serialize};

use crate::record::{Record, RecordKind};

/// A client manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Identity below `manifests/`. Never serialized.
    #[serde(skip)]
    pub filename: String,
    /// Catalogs searched, in priority order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub catalogs: Vec<String>,
    /// Human readable name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    /// Other manifests whose contents are merged into this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included_manifests: Vec<String>,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    /// User the manifest is assigned to.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user: String,
    /// Item sets applied only when their condition matches.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditional_items: Vec<ConditionalItem>,
    /// Items offered for optional self-service install.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optional_installs: Vec<String>,
    /// Items that must be installed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub managed_installs: Vec<String>,
    /// Items that must be removed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub managed_uninstalls: Vec<String>,
    /// Items kept up to date if already present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub managed_updates: Vec<String>,
}

/// A predicate plus the install-set override it guards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalItem {
    /// NSPredicate-style condition string.
    #[serde(default)]
    pub condition: String,
    /// Optional installs applied when the condition holds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optional_installs: Vec<String>,
    /// Managed installs applied when the condition holds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub managed_installs: Vec<String>,
    /// Managed uninstalls applied when the condition holds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub managed_uninstalls: Vec<String>,
    /// Managed updates applied when the condition holds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub managed_updates: Vec<String>,
}

impl Record for Manifest {
    const KIND: RecordKind = RecordKind::Manifest;

    fn filename(&self) -> &str {
        &self.filename
    }

    fn set_filename(&mut self, filename: String) {
        self.filename = filename;
    }
}

/// A partial manifest update.
///
/// Every field is optional. Present fields replace the corresponding field of
/// the target manifest; absent fields leave it untouched. A present empty
/// list clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestPatch {
    /// Ignored when applying; identity comes from the request path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalogs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included_manifests: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional_items: Option<Vec<ConditionalItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_installs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_installs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_uninstalls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_updates: Option<Vec<String>>,
}

impl Manifest {
    /// Copy every field present in `patch` onto this manifest.
    pub fn apply_patch(&mut self, patch: ManifestPatch) {
        let ManifestPatch {
            filename: _,
            catalogs,
            display_name,
            included_manifests,
            notes,
            user,
            conditional_items,
            optional_installs,
            managed_installs,
            managed_uninstalls,
            managed_updates,
        } = patch;

        if let Some(v) = catalogs {
            self.catalogs = v;
        }
        if let Some(v) = display_name {
            self.display_name = v;
        }
        if let Some(v) = included_manifests {
            self.included_manifests = v;
        }
        if let Some(v) = notes {
            self.notes = v;
        }
        if let Some(v) = user {
            self.user = v;
        }
        if let Some(v) = conditional_items {
            self.conditional_items = v;
        }
        if let Some(v) = optional_installs {
            self.optional_installs = v;
        }
        if let Some(v) = managed_installs {
            self.managed_installs = v;
        }
        if let Some(v) = managed_uninstalls {
            self.managed_uninstalls = v;
        }
        if let Some(v) = managed_updates {
            self.managed_updates = v;
        }
    }
}
