//! # Authentication Middleware
//!
//! Two independent gates, each disabled when its secret is unset:
//!
//! | Surface   | Scheme                 | Secret                       |
//! |-----------|------------------------|------------------------------|
//! | `/api/*`  | `Bearer {token}`       | [`AuthConfig::api_token`]    |
//! | `/repo/*` | `Basic {user:password}`| [`AuthConfig::repo_password`]|
//!
//! Munki clients send basic auth with an arbitrary username, so only the
//! password is checked. Both comparisons are constant-time.

use axum::extract::Request;
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use subtle::ConstantTimeEq;

use crate::error::AppError;

/// Realm advertised to clients that fail basic auth.
pub const REPO_REALM: &str = "munki";

// ── Auth Configuration ──────────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts both secrets to prevent credential leakage in logs.
#[derive(Clone, Default)]
pub struct AuthConfig {
    pub api_token: Option<String>,
    pub repo_password: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field(
                "repo_password",
                &self.repo_password.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

// ── Secret Validation ───────────────────────────────────────────────────────

/// Constant-time comparison of secrets.
///
/// When lengths differ, performs a dummy comparison so the mismatch costs
/// roughly the same as a full compare.
fn constant_time_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();

    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }

    provided.ct_eq(expected).into()
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

/// Extract the password from a `Basic` authorization value.
pub fn basic_password(header_value: &str) -> Option<String> {
    let encoded = header_value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;
    let (_user, password) = credentials.split_once(':')?;
    Some(password.to_string())
}

/// Username placed in generated client headers. The server ignores it.
pub const CLIENT_USERNAME: &str = "munki";

/// The `Authorization` header munki clients should send for `password`.
///
/// Clients carry it in the `AdditionalHttpHeaders` preference.
pub fn client_auth_header(password: &str) -> String {
    let credentials = STANDARD.encode(format!("{CLIENT_USERNAME}:{password}"));
    format!("Authorization: Basic {credentials}")
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Require `Authorization: Bearer {api_token}` when a token is configured.
pub async fn bearer_auth(request: Request, next: Next) -> Response {
    let expected = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|config| config.api_token.clone());

    let Some(expected) = expected else {
        return next.run(request).await;
    };

    let rejection = match authorization(request.headers()) {
        Some(value) => match value.strip_prefix("Bearer ") {
            Some(provided) if constant_time_eq(provided, &expected) => None,
            Some(_) => Some("invalid bearer token"),
            None => Some("authorization header must use Bearer scheme"),
        },
        None => Some("missing authorization header"),
    };

    match rejection {
        None => next.run(request).await,
        Some(reason) => {
            tracing::warn!(reason, "authentication failed");
            AppError::Unauthorized(reason.to_string()).into_response()
        }
    }
}

/// Require a basic-auth password on raw file requests when one is configured.
pub async fn basic_auth(request: Request, next: Next) -> Response {
    let expected = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|config| config.repo_password.clone());

    let Some(expected) = expected else {
        return next.run(request).await;
    };

    let provided = authorization(request.headers()).and_then(basic_password);
    match provided {
        Some(password) if constant_time_eq(&password, &expected) => next.run(request).await,
        _ => {
            tracing::warn!(path = %request.uri().path(), "repo basic auth failed");
            login_required()
        }
    }
}

fn login_required() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(
            header::WWW_AUTHENTICATE,
            format!("Basic realm=\"{REPO_REALM}\""),
        )],
        "you need to log in",
    )
        .into_response()
}
