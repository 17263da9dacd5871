//! # Views
//!
//! Content-negotiated rendering of records and collections into response
//! bodies. A view never writes anything; it turns a value into bytes in the
//! requested [`MediaType`].
//!
//! Record and collection views include the record `filename`, which the
//! stored body never carries. Catalog entries are rendered as-is.

use serde::Serialize;

use crate::codec::{encode, MediaType};
use crate::collection::Collection;
use crate::error::ViewError;
use crate::manifest::Manifest;
use crate::pkgsinfo::{CatalogEntry, PkgsInfo};
use crate::record::Record;

/// A rendered response body and the format it is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Format of `data`.
    pub media_type: MediaType,
    /// Encoded body.
    pub data: Vec<u8>,
}

/// Something that can be rendered as a response body.
pub trait View {
    /// Render in the given format.
    fn view(&self, media: MediaType) -> Result<Rendered, ViewError>;

    /// Render using a raw format tag.
    ///
    /// Unlike [`MediaType::negotiate`], an unrecognized tag is an error.
    fn view_as(&self, tag: &str) -> Result<Rendered, ViewError> {
        let media = MediaType::parse(tag)
            .map_err(|_| ViewError::UnsupportedMediaType(tag.to_string()))?;
        self.view(media)
    }
}

/// Render any serializable value.
pub fn render<T: Serialize>(value: &T, media: MediaType) -> Result<Rendered, ViewError> {
    Ok(Rendered {
        media_type: media,
        data: encode(value, media)?,
    })
}

/// A record body with its identity added back in.
#[derive(Serialize)]
struct WithFilename<'a, R> {
    #[serde(skip_serializing_if = "str::is_empty")]
    filename: &'a str,
    #[serde(flatten)]
    record: &'a R,
}

impl<'a, R: Record> WithFilename<'a, R> {
    fn new(record: &'a R) -> Self {
        Self {
            filename: record.filename(),
            record,
        }
    }
}

impl View for Manifest {
    fn view(&self, media: MediaType) -> Result<Rendered, ViewError> {
        render(&WithFilename::new(self), media)
    }
}

impl View for PkgsInfo {
    fn view(&self, media: MediaType) -> Result<Rendered, ViewError> {
        render(&WithFilename::new(self), media)
    }
}

impl<R: Record> View for Collection<R> {
    fn view(&self, media: MediaType) -> Result<Rendered, ViewError> {
        let items: Vec<WithFilename<'_, R>> = self.iter().map(WithFilename::new).collect();
        render(&items, media)
    }
}

impl View for Vec<CatalogEntry> {
    fn view(&self, media: MediaType) -> Result<Rendered, ViewError> {
        render(self, media)
    }
}

/// A missing value renders as [`ViewError::NoData`].
impl<V: View> View for Option<V> {
    fn view(&self, media: MediaType) -> Result<Rendered, ViewError> {
        match self {
            Some(inner) => inner.view(media),
            None => Err(ViewError::NoData),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error body returned by the API, in the negotiated format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    /// Human readable messages.
    pub errors: Vec<String>,
}

impl ErrorResponse {
    /// A response carrying a single message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }
}

impl View for ErrorResponse {
    fn view(&self, media: MediaType) -> Result<Rendered, ViewError> {
        render(self, media)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;

    fn manifest() -> Manifest {
        Manifest {
            filename: "site_default".to_string(),
            catalogs: vec!["production".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn record_view_adds_filename() {
        let out = manifest().view(MediaType::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out.data).unwrap();
        assert_eq!(value["filename"], "site_default");
        assert_eq!(value["catalogs"][0], "production");
        assert_eq!(out.media_type, MediaType::Json);
    }

    #[test]
    fn plist_view_adds_filename() {
        let out = manifest().view(MediaType::Plist).unwrap();
        let text = String::from_utf8(out.data).unwrap();
        assert!(text.contains("<key>filename</key>"));
        assert!(text.contains("<string>site_default</string>"));
    }

    #[test]
    fn collection_view_is_an_array_with_filenames() {
        let c = Collection::new(vec![manifest(), Manifest::shell("lab")]);
        let out = c.view(MediaType::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out.data).unwrap();
        let arr = value.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[1]["filename"], "lab");
    }

    #[test]
    fn empty_collection_renders_empty_array() {
        let out = Collection::<PkgsInfo>::default().view(MediaType::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out.data).unwrap();
        assert_eq!(value, serde_json::json!([]));
    }

    #[test]
    fn missing_value_is_no_data() {
        let none: Option<Manifest> = None;
        assert!(matches!(none.view(MediaType::Json), Err(ViewError::NoData)));
    }

    #[test]
    fn view_as_rejects_unknown_tags() {
        let err = manifest().view_as("text/html").unwrap_err();
        assert!(matches!(err, ViewError::UnsupportedMediaType(ref t) if t == "text/html"));
        assert!(manifest().view_as("application/xml").is_ok());
    }

    #[test]
    fn error_response_renders_in_both_formats() {
        let body = ErrorResponse::new("manifest not found");
        let json = body.view(MediaType::Json).unwrap();
        let back: ErrorResponse = decode(&json.data, MediaType::Json).unwrap();
        assert_eq!(back, body);

        let xml = String::from_utf8(body.view(MediaType::Plist).unwrap().data).unwrap();
        assert!(xml.contains("<key>errors</key>"));
    }

    #[test]
    fn pkgsinfo_view_with_date_renders_in_plist() {
        let mut info = PkgsInfo::shell("apps/firefox.plist");
        info.force_install_after_date = Some(plist::Date::from(std::time::SystemTime::UNIX_EPOCH));
        let xml = String::from_utf8(info.view(MediaType::Plist).unwrap().data).unwrap();
        assert!(xml.contains("<date>1970-01-01T00:00:00Z</date>"));
    }
}
