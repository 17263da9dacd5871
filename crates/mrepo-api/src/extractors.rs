//! # Custom Extractors
//!
//! [`Payload`] buffers a record body together with the codec named by its
//! `Content-Type`. A missing header means JSON; anything unrecognized is a
//! 400 before the body is read.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::header;
use mrepo_core::codec::decode;
use mrepo_core::{FilenameField, MediaType, Record};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// A submitted record body and its format.
#[derive(Debug, Clone)]
pub struct Payload {
    media: MediaType,
    bytes: Bytes,
}

impl<S: Send + Sync> FromRequest<S> for Payload {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let media = match req.headers().get(header::CONTENT_TYPE) {
            None => MediaType::Json,
            Some(value) => {
                let tag = value
                    .to_str()
                    .map_err(|_| AppError::BadRequest("Content-Type is not valid text".into()))?;
                MediaType::parse(tag)
                    .map_err(|_| AppError::BadRequest(format!("incorrect Content-Type: {tag}")))?
            }
        };
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read request body: {e}")))?;
        Ok(Self { media, bytes })
    }
}

impl Payload {
    /// The format the body was submitted in.
    pub fn media(&self) -> MediaType {
        self.media
    }

    /// Decode the body.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        decode(&self.bytes, self.media)
            .map_err(|e| AppError::BadRequest(format!("failed to decode request payload: {e}")))
    }

    /// Decode a create request: the record plus its required `filename` key.
    pub fn decode_new<R: Record>(&self) -> Result<R, AppError> {
        let filename = self.decode::<FilenameField>()?.into_filename();
        if filename.is_empty() {
            return Err(AppError::BadRequest(format!(
                "the filename field is required to create a {}",
                R::KIND
            )));
        }
        let mut record: R = self.decode()?;
        record.set_filename(filename);
        Ok(record)
    }
}
