//! # Error Hierarchy
//!
//! Structured error types for the record layer, built with `thiserror`.
//! Storage and transport crates wrap these in their own error enums.

use thiserror::Error;

/// Errors raised while encoding or decoding a record payload.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The payload did not match the expected record structure.
    #[error("decode error ({media_type}): {reason}")]
    Decode {
        /// The wire format that was being decoded.
        media_type: &'static str,
        /// Parser message.
        reason: String,
    },

    /// A record could not be serialized.
    #[error("encode error ({media_type}): {reason}")]
    Encode {
        /// The wire format that was being produced.
        media_type: &'static str,
        /// Serializer message.
        reason: String,
    },

    /// The format tag is neither `application/json` nor `application/xml`.
    #[error("unsupported format: \"{0}\"")]
    UnsupportedFormat(String),
}

/// Required-field violations detected before a record is persisted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The record identity (its filename under the repository) is empty.
    #[error("filename key must be set")]
    MissingFilename,
}

/// Errors raised by the view layer while rendering a response body.
#[derive(Error, Debug)]
pub enum ViewError {
    /// There was no record to render. Maps to "not found" at the transport.
    #[error("no data")]
    NoData,

    /// The negotiated media type is not one the view layer can produce.
    #[error("unsupported media type: \"{0}\"")]
    UnsupportedMediaType(String),

    /// The record could not be serialized.
    #[error(transparent)]
    Codec(#[from] CodecError),
}
