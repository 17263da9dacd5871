//! # Record Codec
//!
//! Encodes and decodes records to and from the two wire formats the
//! repository speaks: JSON and the XML property-list format ("plist").
//!
//! The same codec is used for on-disk persistence (always plist) and for
//! HTTP request/response bodies (negotiated per request).
//!
//! ## Media Types
//!
//! | Tag                | Format                    |
//! |--------------------|---------------------------|
//! | `application/json` | pretty-printed JSON       |
//! | `application/xml`  | XML plist, 2-space indent |
//!
//! Parameters such as `; charset=utf-8` are ignored when parsing a tag.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CodecError;

/// The wire formats understood by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MediaType {
    /// `application/json`
    #[default]
    Json,
    /// `application/xml`, an XML property list.
    Plist,
}

impl MediaType {
    /// The canonical media type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Plist => "application/xml",
        }
    }

    /// The value to send in a `Content-Type` response header.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json; charset=utf-8",
            Self::Plist => "application/xml; charset=utf-8",
        }
    }

    /// Parse a format tag strictly.
    ///
    /// Only the essence (the part before any `;`) is compared, case-insensitively.
    pub fn parse(tag: &str) -> Result<Self, CodecError> {
        let essence = tag.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case("application/json") {
            Ok(Self::Json)
        } else if essence.eq_ignore_ascii_case("application/xml") {
            Ok(Self::Plist)
        } else {
            Err(CodecError::UnsupportedFormat(tag.to_string()))
        }
    }

    /// Pick an output format from an optional `Accept` value.
    ///
    /// Anything that is not recognized, including a missing header or a
    /// wildcard, falls back to JSON.
    pub fn negotiate(accept: Option<&str>) -> Self {
        accept
            .and_then(|value| Self::parse(value).ok())
            .unwrap_or(Self::Json)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Serialize `value` in the given format.
pub fn encode<T: Serialize>(value: &T, media: MediaType) -> Result<Vec<u8>, CodecError> {
    match media {
        MediaType::Json => serde_json::to_vec_pretty(value).map_err(|e| CodecError::Encode {
            media_type: media.as_str(),
            reason: e.to_string(),
        }),
        MediaType::Plist => {
            let mut buf = Vec::new();
            let options = plist::XmlWriteOptions::default().indent(b' ', 2);
            plist::to_writer_xml_with_options(&mut buf, value, &options).map_err(|e| {
                CodecError::Encode {
                    media_type: media.as_str(),
                    reason: e.to_string(),
                }
            })?;
            Ok(buf)
        }
    }
}

/// Deserialize a `T` from `bytes` in the given format.
pub fn decode<T: DeserializeOwned>(bytes: &[u8], media: MediaType) -> Result<T, CodecError> {
    match media {
        MediaType::Json => serde_json::from_slice(bytes).map_err(|e| CodecError::Decode {
            media_type: media.as_str(),
            reason: e.to_string(),
        }),
        MediaType::Plist => plist::from_bytes(bytes).map_err(|e| CodecError::Decode {
            media_type: media.as_str(),
            reason: e.to_string(),
        }),
    }
}

/// Decode using a raw format tag, as received in a `Content-Type` header.
pub fn decode_tagged<T: DeserializeOwned>(bytes: &[u8], tag: &str) -> Result<T, CodecError> {
    decode(bytes, MediaType::parse(tag)?)
}
