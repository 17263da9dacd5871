//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec served
//! at `/openapi.json`. Record bodies are negotiated between JSON and plist
//! and are documented by description rather than schema.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "mrepo: Munki Repository API",
        version = "0.1.0",
        description = "Manage manifests, pkgsinfos, packages, and catalogs of a munki repository.",
        license(name = "Apache-2.0")
    ),
    paths(
        // Manifests
        crate::routes::manifests::list_manifests,
        crate::routes::manifests::show_manifest,
        crate::routes::manifests::create_manifest,
        crate::routes::manifests::replace_manifest,
        crate::routes::manifests::update_manifest,
        crate::routes::manifests::delete_manifest,
        // Pkgsinfo
        crate::routes::pkgsinfo::list_pkgsinfo,
        crate::routes::pkgsinfo::show_pkgsinfo,
        crate::routes::pkgsinfo::create_pkgsinfo,
        crate::routes::pkgsinfo::replace_pkgsinfo,
        crate::routes::pkgsinfo::delete_pkgsinfo,
        // Pkgs
        crate::routes::pkgs::upload_pkg,
        crate::routes::pkgs::delete_pkg,
        // Catalogs
        crate::routes::catalogs::list_catalogs,
        crate::routes::catalogs::show_catalog,
        // Raw files
        crate::routes::repo_files::serve_file,
        // Operations
        crate::routes::health::healthz,
        crate::routes::health::version,
    ),
    components(schemas(
        crate::routes::pkgs::PkgUpload,
        crate::routes::health::HealthStatus,
        crate::routes::health::VersionInfo,
    )),
    tags(
        (name = "manifests", description = "Client manifests"),
        (name = "pkgsinfo", description = "Package metadata records"),
        (name = "pkgs", description = "Installer binaries"),
        (name = "catalogs", description = "Generated catalogs"),
        (name = "repo", description = "Raw repository files for munki clients"),
        (name = "operations", description = "Health and version probes"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
///
/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
