//! # mrepo-api: HTTP Transport for a Munki Repository
//!
//! Axum routes over [`mrepo_store::FileRepository`]. Record bodies are
//! JSON or plist: the `Content-Type` header selects the input codec and the
//! `Accept` header selects the output format, errors included.
//!
//! ## API Surface
//!
//! | Prefix            | Module                     | Auth           |
//! |-------------------|----------------------------|----------------|
//! | `/api/manifests*` | [`routes::manifests`]      | bearer token   |
//! | `/api/pkgsinfo*`  | [`routes::pkgsinfo`]       | bearer token   |
//! | `/api/pkgs*`      | [`routes::pkgs`]           | bearer token   |
//! | `/api/catalogs*`  | [`routes::catalogs`]       | bearer token   |
//! | `/repo/*`         | [`routes::repo_files`]     | basic password |
//! | `/healthz`, `/version`, `/openapi.json` | [`routes::health`], [`openapi`] | none |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → NegotiateErrors → BearerAuth (/api) | BasicAuth (/repo) → Handler
//! ```

pub mod auth;
pub mod error;
pub mod extractors;
pub mod negotiate;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

pub use crate::error::AppError;
pub use crate::state::AppConfig;

/// Assemble the full application router with all routes and middleware.
///
/// Health, version, and OpenAPI routes are mounted outside both auth gates
/// so they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        api_token: state.config.api_token.clone(),
        repo_password: state.config.repo_password.clone(),
    };

    let api = Router::new()
        .merge(routes::manifests::router())
        .merge(routes::pkgsinfo::router())
        .merge(routes::pkgs::router())
        .merge(routes::catalogs::router())
        .layer(from_fn(auth::bearer_auth));

    let files = routes::repo_files::router().layer(from_fn(auth::basic_auth));

    let open = Router::new()
        .merge(routes::health::router())
        .merge(openapi::router());

    Router::new()
        .merge(api)
        .merge(files)
        .merge(open)
        .layer(from_fn(negotiate::negotiate_errors))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .with_state(state)
}
