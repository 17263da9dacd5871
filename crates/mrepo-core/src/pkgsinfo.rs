//! # Package Descriptors
//!
//! A pkgsinfo record describes one installable version of a package: how to
//! detect it, how to install and remove it, which catalogs it belongs to,
//! and the size and hash of the installer item under `pkgs/`.
//!
//! Keys follow the munki pkginfo naming, including the handful of
//! CamelCase keys (`OnDemand`, `RestartAction`, `PackageURL`, ...).
//! Dates are plist dates and render as RFC 3339 strings in JSON.
//!
//! A [`CatalogEntry`] is the projection of a pkgsinfo written into the
//! derived catalog files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::{Record, RecordKind};

/// A package descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PkgsInfo {
    /// Identity below `pkgsinfo/`. Never serialized.
    #[serde(skip)]
    pub filename: String,

    // -- identity --------------------------------------------------------
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub developer: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,

    /// Catalogs this package is a member of.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub catalogs: Vec<String>,

    // -- dependencies and bounds -----------------------------------------
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub update_for: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocking_applications: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supported_architectures: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub minimum_munki_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub minimum_os_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub maximum_os_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub installable_condition: String,

    // -- installer item --------------------------------------------------
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub installer_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub installer_item_location: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub installer_item_hash: String,
    /// Size of the installer item in kilobytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installer_item_size: Option<u64>,
    /// Installed footprint in kilobytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_size: Option<u64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uninstaller_item_location: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub package_path: String,
    #[serde(rename = "PackageURL", default, skip_serializing_if = "String::is_empty")]
    pub package_url: String,
    #[serde(
        rename = "PackageCompleteURL",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub package_complete_url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub installer_choices_xml: Vec<InstallerChoice>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub installer_environment: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items_to_copy: Vec<ItemToCopy>,

    // -- detection -------------------------------------------------------
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub installs: Vec<Install>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub receipts: Vec<Receipt>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub installcheck_script: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uninstallcheck_script: String,

    // -- scripts ---------------------------------------------------------
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub preinstall_script: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub postinstall_script: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uninstall_script: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub postuninstall_script: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uninstall_method: String,

    // -- behaviour flags -------------------------------------------------
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoremove: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy_local: Option<bool>,
    #[serde(rename = "OnDemand", default, skip_serializing_if = "Option::is_none")]
    pub on_demand: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppress_bundle_relocation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unattended_install: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unattended_uninstall: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apple_item: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uninstallable: Option<bool>,
    #[serde(rename = "RestartAction", default, skip_serializing_if = "String::is_empty")]
    pub restart_action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_install_after_date: Option<plist::Date>,

    // -- Adobe -----------------------------------------------------------
    #[serde(rename = "AdobeSetupType", default, skip_serializing_if = "String::is_empty")]
    pub adobe_setup_type: String,
    /// Opaque Adobe payload dictionaries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payloads: Vec<BTreeMap<String, plist::Value>>,
    /// Only present for Creative Suite installers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adobe_install_info: Option<AdobeInstallInfo>,

    /// Creation bookkeeping written by the import tooling.
    #[serde(rename = "_metadata", default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PkgsInfoMetadata>,
}

/// Import bookkeeping. Stripped from catalog entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkgsInfoMetadata {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<plist::Date>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub munki_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub os_version: String,
}

/// An item whose presence proves the package is installed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Install {
    #[serde(rename = "CFBundleIdentifier", default, skip_serializing_if = "String::is_empty")]
    pub bundle_identifier: String,
    #[serde(rename = "CFBundleName", default, skip_serializing_if = "String::is_empty")]
    pub bundle_name: String,
    #[serde(
        rename = "CFBundleShortVersionString",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub bundle_short_version_string: String,
    #[serde(rename = "CFBundleVersion", default, skip_serializing_if = "String::is_empty")]
    pub bundle_version: String,
    #[serde(rename = "md5checksum", default, skip_serializing_if = "String::is_empty")]
    pub md5_checksum: String,
    #[serde(rename = "minosversion", default, skip_serializing_if = "String::is_empty")]
    pub min_os_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version_comparison_key: String,
}

/// A package receipt left behind by the installer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_size: Option<u64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "packageid", default, skip_serializing_if = "String::is_empty")]
    pub package_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

/// A copy instruction for disk-image installers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemToCopy {
    #[serde(default)]
    pub source_item: String,
    #[serde(default)]
    pub destination_path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mode: String,
}

/// One `installer -applyChoiceChangesXML` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallerChoice {
    #[serde(rename = "attributeSetting", default, skip_serializing_if = "Option::is_none")]
    pub attribute_setting: Option<i64>,
    #[serde(rename = "choiceAttribute", default, skip_serializing_if = "String::is_empty")]
    pub choice_attribute: String,
    #[serde(rename = "choiceIdentifier", default, skip_serializing_if = "String::is_empty")]
    pub choice_identifier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdobeInstallInfo {
    #[serde(rename = "serialnumber", default, skip_serializing_if = "String::is_empty")]
    pub serial_number: String,
    #[serde(rename = "installxml", default, skip_serializing_if = "String::is_empty")]
    pub install_xml: String,
    #[serde(rename = "uninstallxml", default, skip_serializing_if = "String::is_empty")]
    pub uninstall_xml: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub media_signature: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub media_digest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppress_registration: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppress_updates: Option<bool>,
}

impl Record for PkgsInfo {
    const KIND: RecordKind = RecordKind::Pkgsinfo;

    fn filename(&self) -> &str {
        &self.filename
    }

    fn set_filename(&mut self, filename: String) {
        self.filename = filename;
    }
}

impl PkgsInfo {
    /// Whether this package is a member of `catalog`.
    pub fn in_catalog(&self, catalog: &str) -> bool {
        self.catalogs.iter().any(|c| c == catalog)
    }
}

// ---------------------------------------------------------------------------
// Catalog entries
// ---------------------------------------------------------------------------

/// A pkgsinfo as it appears inside a catalog file: the record without its
/// identity, `_metadata` or the Adobe installer fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogEntry(PkgsInfo);

impl CatalogEntry {
    /// Borrow the projected record.
    pub fn info(&self) -> &PkgsInfo {
        &self.0
    }

    /// Unwrap the projected record.
    pub fn into_inner(self) -> PkgsInfo {
        self.0
    }
}

impl From<&PkgsInfo> for CatalogEntry {
    fn from(info: &PkgsInfo) -> Self {
        Self::from(info.clone())
    }
}

impl From<PkgsInfo> for CatalogEntry {
    fn from(mut info: PkgsInfo) -> Self {
        info.filename = String::new();
        info.metadata = None;
        info.adobe_setup_type = String::new();
        info.payloads = Vec::new();
        info.adobe_install_info = None;
        Self(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode, MediaType};

    const FIREFOX_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
  <key>_metadata</key>
  <dict>
    <key>created_by</key>
    <string>admin</string>
    <key>creation_date</key>
    <date>2017-01-05T18:20:33Z</date>
    <key>munki_version</key>
    <string>2.8.2</string>
  </dict>
  <key>catalogs</key>
  <array>
    <string>testing</string>
  </array>
  <key>installer_item_size</key>
  <integer>50312</integer>
  <key>installs</key>
  <array>
    <dict>
      <key>CFBundleIdentifier</key>
      <string>org.mozilla.firefox</string>
      <key>path</key>
      <string>/Applications/Firefox.app</string>
      <key>type</key>
      <string>application</string>
    </dict>
  </array>
  <key>name</key>
  <string>Firefox</string>
  <key>unattended_install</key>
  <true/>
  <key>RestartAction</key>
  <string>None</string>
  <key>version</key>
  <string>50.1.0</string>
</dict>
</plist>
"#;

    #[test]
    fn decodes_a_munki_pkginfo() {
        let info: PkgsInfo = decode(FIREFOX_PLIST.as_bytes(), MediaType::Plist).unwrap();
        assert_eq!(info.name, "Firefox");
        assert_eq!(info.version, "50.1.0");
        assert_eq!(info.installer_item_size, Some(50312));
        assert_eq!(info.unattended_install, Some(true));
        assert_eq!(info.restart_action, "None");
        assert_eq!(info.installs[0].bundle_identifier, "org.mozilla.firefox");
        assert_eq!(info.installs[0].kind, "application");
        let meta = info.metadata.as_ref().unwrap();
        assert_eq!(meta.created_by, "admin");
        assert!(meta.creation_date.is_some());
    }

    #[test]
    fn dates_render_as_rfc3339_in_json() {
        let info: PkgsInfo = decode(FIREFOX_PLIST.as_bytes(), MediaType::Plist).unwrap();
        let json = String::from_utf8(encode(&info, MediaType::Json).unwrap()).unwrap();
        assert!(json.contains("\"creation_date\": \"2017-01-05T18:20:33Z\""));

        let back: PkgsInfo = decode(json.as_bytes(), MediaType::Json).unwrap();
        assert_eq!(back, info);
    }

    #[test]
    fn explicit_false_survives_round_trip() {
        let info = PkgsInfo {
            name: "munkitools".to_string(),
            uninstallable: Some(false),
            ..Default::default()
        };
        let bytes = encode(&info, MediaType::Plist).unwrap();
        let back: PkgsInfo = decode(&bytes, MediaType::Plist).unwrap();
        assert_eq!(back.uninstallable, Some(false));
        assert_eq!(back.autoremove, None);
    }

    #[test]
    fn catalog_entry_strips_bookkeeping() {
        let mut info: PkgsInfo = decode(FIREFOX_PLIST.as_bytes(), MediaType::Plist).unwrap();
        info.filename = "apps/firefox-50.1.0.plist".to_string();
        let entry = CatalogEntry::from(&info);

        assert!(entry.info().filename.is_empty());
        assert!(entry.info().metadata.is_none());
        assert_eq!(entry.info().name, "Firefox");

        let xml = String::from_utf8(encode(&entry, MediaType::Plist).unwrap()).unwrap();
        assert!(!xml.contains("_metadata"));
        assert!(!xml.contains("filename"));
        assert!(xml.contains("<key>installs</key>"));
    }

    #[test]
    fn catalog_entry_drops_adobe_fields() {
        let mut payload = BTreeMap::new();
        payload.insert(
            "AdobeCode".to_string(),
            plist::Value::String("{ABC-123}".to_string()),
        );
        let info = PkgsInfo {
            filename: "adobe/photoshop.plist".to_string(),
            name: "Photoshop".to_string(),
            adobe_setup_type: "ProductInstall".to_string(),
            payloads: vec![payload],
            adobe_install_info: Some(AdobeInstallInfo::default()),
            ..Default::default()
        };
        let entry = CatalogEntry::from(info);

        assert_eq!(entry.info().name, "Photoshop");
        assert!(entry.info().adobe_setup_type.is_empty());
        assert!(entry.info().payloads.is_empty());
        assert!(entry.info().adobe_install_info.is_none());

        let xml = String::from_utf8(encode(&entry, MediaType::Plist).unwrap()).unwrap();
        assert!(!xml.contains("AdobeSetupType"));
        assert!(!xml.contains("AdobeCode"));
    }

    #[test]
    fn in_catalog_checks_membership() {
        let info = PkgsInfo {
            catalogs: vec!["testing".to_string(), "production".to_string()],
            ..Default::default()
        };
        assert!(info.in_catalog("production"));
        assert!(!info.in_catalog("development"));
    }
}
