//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps repository, codec, and view errors to HTTP status codes.
//!
//! Error bodies are an [`ErrorResponse`]. [`AppError`] always renders JSON
//! and attaches the `ErrorResponse` to the response extensions so the
//! [`negotiate_errors`](crate::negotiate::negotiate_errors) middleware can
//! re-render it in the format the client asked for. Internal error details
//! are logged and never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mrepo_core::{CodecError, ErrorResponse, MediaType, ValidationError, View, ViewError};
use mrepo_store::RepoError;
use thiserror::Error;

use crate::negotiate::rendered_response;

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("{0}")]
    NotFound(String),

    /// Request could not be decoded or failed validation (400).
    #[error("{0}")]
    BadRequest(String),

    /// Identity already taken (409).
    #[error("{0}")]
    Conflict(String),

    /// Missing or invalid credentials (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The body sent to the client.
    pub fn body(&self) -> ErrorResponse {
        match self {
            Self::Internal(_) => ErrorResponse::new("an internal error occurred"),
            other => ErrorResponse::new(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = self.body();
        let mut response = match body.view(MediaType::Json) {
            Ok(rendered) => rendered_response(status, rendered),
            Err(e) => {
                tracing::error!(error = %e, "failed to render error body");
                status.into_response()
            }
        };
        response.extensions_mut().insert(body);
        response
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match &err {
            RepoError::NotFound { .. } => Self::NotFound(err.to_string()),
            RepoError::AlreadyExists { .. } => Self::Conflict(err.to_string()),
            RepoError::InvalidPath { .. } | RepoError::Validation(_) => {
                Self::BadRequest(err.to_string())
            }
            RepoError::Codec(_) | RepoError::Io { .. } => Self::Internal(err.to_string()),
        }
    }
}

/// Codec errors reaching a handler come from submitted payloads.
impl From<CodecError> for AppError {
    fn from(err: CodecError) -> Self {
        match &err {
            CodecError::Decode { .. } | CodecError::UnsupportedFormat(_) => {
                Self::BadRequest(err.to_string())
            }
            CodecError::Encode { .. } => Self::Internal(err.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<ViewError> for AppError {
    fn from(err: ViewError) -> Self {
        match err {
            ViewError::NoData => Self::NotFound("Not Found".to_string()),
            ViewError::UnsupportedMediaType(tag) => {
                Self::BadRequest(format!("unsupported media type: {tag}"))
            }
            ViewError::Codec(e) => Self::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn not_found_status_code() {
        let err = AppError::NotFound("missing manifest".to_string());
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn bad_request_status_code() {
        let err = AppError::BadRequest("bad payload".to_string());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn conflict_status_code() {
        let err = AppError::Conflict("taken".to_string());
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn unauthorized_status_code() {
        let err = AppError::Unauthorized("no token".to_string());
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn internal_status_code() {
        let err = AppError::Internal("disk on fire".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn repo_errors_map_to_statuses() {
        let cases = [
            (
                RepoError::NotFound {
                    kind: "manifest",
                    name: "x".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                RepoError::AlreadyExists {
                    kind: "manifest",
                    name: "x".into(),
                },
                StatusCode::CONFLICT,
            ),
            (
                RepoError::InvalidPath {
                    path: "../x".into(),
                    reason: "relative path segment",
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                RepoError::Validation(ValidationError::MissingFilename),
                StatusCode::BAD_REQUEST,
            ),
            (
                RepoError::Io {
                    path: "/srv/munki".into(),
                    source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (repo_err, expected) in cases {
            assert_eq!(AppError::from(repo_err).status(), expected);
        }
    }

    #[test]
    fn decode_errors_are_client_errors() {
        let err = CodecError::Decode {
            media_type: "application/json",
            reason: "EOF".into(),
        };
        assert_eq!(AppError::from(err).status(), StatusCode::BAD_REQUEST);
        let err = CodecError::UnsupportedFormat("text/csv".into());
        assert_eq!(AppError::from(err).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn no_data_is_not_found() {
        assert_eq!(
            AppError::from(ViewError::NoData).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn internal_message_is_hidden() {
        let response = AppError::Internal("/srv/munki: permission denied".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("permission denied"));
        assert!(text.contains("an internal error occurred"));
    }

    #[tokio::test]
    async fn error_body_is_json_by_default() {
        let response = AppError::Conflict("manifest site_default already exists".into())
            .into_response();
        assert!(response.extensions().get::<ErrorResponse>().is_some());
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.errors, vec!["manifest site_default already exists"]);
    }
}
