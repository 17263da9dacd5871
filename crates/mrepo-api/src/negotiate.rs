//! # Content Negotiation
//!
//! The `Accept` header picks the response format. Anything other than a
//! recognized JSON or plist type falls back to JSON.
//!
//! Handlers take an [`Accept`] extractor and build success responses with
//! [`rendered_response`]. Error responses are produced as JSON by
//! [`AppError`](crate::error::AppError) and converted on the way out by
//! [`negotiate_errors`], which also covers errors raised by middleware and
//! extractors that never see the handler's `Accept` value.

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use mrepo_core::{ErrorResponse, MediaType, Rendered, View};

/// The response format requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accept(pub MediaType);

impl<S: Send + Sync> FromRequestParts<S> for Accept {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(accepted_media(&parts.headers)))
    }
}

/// Output format for a set of request headers.
pub fn accepted_media(headers: &HeaderMap) -> MediaType {
    MediaType::negotiate(headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()))
}

/// Wrap a rendered body with its status and `Content-Type`.
pub fn rendered_response(status: StatusCode, rendered: Rendered) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, rendered.media_type.content_type())],
        rendered.data,
    )
        .into_response()
}

/// Re-render error bodies in the format the client asked for.
pub async fn negotiate_errors(request: Request, next: Next) -> Response {
    let media = accepted_media(request.headers());
    let mut response = next.run(request).await;
    if media == MediaType::Json {
        return response;
    }
    let Some(body) = response.extensions_mut().remove::<ErrorResponse>() else {
        return response;
    };
    match body.view(media) {
        Ok(rendered) => {
            let (mut parts, _) = response.into_parts();
            parts.headers.remove(header::CONTENT_LENGTH);
            parts.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(media.content_type()),
            );
            Response::from_parts(parts, Body::from(rendered.data))
        }
        Err(e) => {
            tracing::error!(error = %e, media = %media, "failed to re-render error body");
            response
        }
    }
}
