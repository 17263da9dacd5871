//! # Health and Version
//!
//! Unauthenticated probes. `/healthz` reports unhealthy when the repository
//! storage is unreachable.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use mrepo_store::CatalogState;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Build version information.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VersionInfo {
    /// Package name.
    pub name: String,
    /// Package version.
    pub version: String,
}

/// Health probe body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthStatus {
    /// `ok` or `unavailable`.
    pub status: String,
    /// Whether a catalog rebuild is running right now.
    pub catalog_rebuilding: bool,
    /// Catalog rebuild passes completed since startup.
    pub catalog_generation: u64,
}

/// Build the health router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/version", get(version))
}

/// GET /healthz: storage reachability and catalog builder progress.
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Repository reachable", body = HealthStatus),
        (status = 500, description = "Repository storage unavailable", body = HealthStatus),
    ),
    tag = "operations"
)]
pub async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let files = state.files.clone();
    let healthy = tokio::task::spawn_blocking(move || files.healthy())
        .await
        .unwrap_or(false);

    let body = HealthStatus {
        status: if healthy { "ok" } else { "unavailable" }.to_string(),
        catalog_rebuilding: state.catalogs.state() == CatalogState::Rebuilding,
        catalog_generation: state.catalogs.generation(),
    };
    if healthy {
        (StatusCode::OK, Json(body))
    } else {
        tracing::warn!("health check failed: repository storage unavailable");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body))
    }
}

/// GET /version: package name and version.
#[utoipa::path(
    get,
    path = "/version",
    responses((status = 200, description = "Build version", body = VersionInfo)),
    tag = "operations"
)]
pub async fn version() -> Json<VersionInfo> {
    Json(VersionInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
