//! # Manifest Routes
//!
//! CRUD over `manifests/`. Manifest names may contain `/`, so the
//! single-record routes capture the rest of the path.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use mrepo_core::{Manifest, ManifestPatch, View};

use crate::error::AppError;
use crate::extractors::Payload;
use crate::negotiate::{rendered_response, Accept};
use crate::routes::create_record;
use crate::state::AppState;

/// Build the manifests router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/manifests", get(list_manifests).post(create_manifest))
        .route(
            "/api/manifests/{*name}",
            get(show_manifest)
                .put(replace_manifest)
                .patch(update_manifest)
                .delete(delete_manifest),
        )
}

/// GET /api/manifests: list every manifest.
#[utoipa::path(
    get,
    path = "/api/manifests",
    responses(
        (status = 200, description = "All manifests, each with its filename"),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    tag = "manifests"
)]
pub async fn list_manifests(
    State(state): State<AppState>,
    Accept(media): Accept,
) -> Result<Response, AppError> {
    let manifests = state.with_repo(|repo| repo.list_manifests()).await?;
    Ok(rendered_response(StatusCode::OK, manifests.view(media)?))
}

/// GET /api/manifests/{name}: fetch one manifest.
#[utoipa::path(
    get,
    path = "/api/manifests/{name}",
    params(("name" = String, Path, description = "Manifest path below manifests/")),
    responses(
        (status = 200, description = "Manifest found"),
        (status = 404, description = "Manifest not found"),
    ),
    tag = "manifests"
)]
pub async fn show_manifest(
    State(state): State<AppState>,
    Accept(media): Accept,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let manifest = state.with_repo(move |repo| repo.get_manifest(&name)).await?;
    Ok(rendered_response(StatusCode::OK, manifest.view(media)?))
}

/// POST /api/manifests: create a manifest from a body carrying `filename`.
#[utoipa::path(
    post,
    path = "/api/manifests",
    responses(
        (status = 201, description = "Manifest created"),
        (status = 400, description = "Malformed payload or missing filename"),
        (status = 409, description = "A manifest with that filename already exists"),
    ),
    tag = "manifests"
)]
pub async fn create_manifest(
    State(state): State<AppState>,
    Accept(media): Accept,
    payload: Payload,
) -> Result<Response, AppError> {
    let manifest: Manifest = payload.decode_new()?;
    let manifest = state
        .with_repo(move |repo| create_record(repo, manifest))
        .await?;
    tracing::info!(manifest = %manifest.filename, "created manifest");
    Ok(rendered_response(StatusCode::CREATED, manifest.view(media)?))
}

/// PUT /api/manifests/{name}: replace a manifest with the submitted body.
#[utoipa::path(
    put,
    path = "/api/manifests/{name}",
    params(("name" = String, Path, description = "Manifest path below manifests/")),
    responses(
        (status = 200, description = "Manifest replaced"),
        (status = 400, description = "Malformed payload"),
        (status = 404, description = "Manifest not found"),
    ),
    tag = "manifests"
)]
pub async fn replace_manifest(
    State(state): State<AppState>,
    Accept(media): Accept,
    Path(name): Path<String>,
    payload: Payload,
) -> Result<Response, AppError> {
    let mut manifest: Manifest = payload.decode()?;
    manifest.filename = name;
    let manifest = state
        .with_repo(move |repo| repo.save_manifest(&manifest).map(|()| manifest))
        .await?;
    Ok(rendered_response(StatusCode::OK, manifest.view(media)?))
}

/// PATCH /api/manifests/{name}: overwrite only the fields present in the body.
#[utoipa::path(
    patch,
    path = "/api/manifests/{name}",
    params(("name" = String, Path, description = "Manifest path below manifests/")),
    responses(
        (status = 200, description = "Manifest updated"),
        (status = 400, description = "Malformed payload"),
        (status = 404, description = "Manifest not found"),
    ),
    tag = "manifests"
)]
pub async fn update_manifest(
    State(state): State<AppState>,
    Accept(media): Accept,
    Path(name): Path<String>,
    payload: Payload,
) -> Result<Response, AppError> {
    let patch: ManifestPatch = payload.decode()?;
    let manifest = state
        .with_repo(move |repo| {
            let mut manifest = repo.get_manifest(&name)?;
            manifest.apply_patch(patch);
            repo.save_manifest(&manifest)?;
            Ok(manifest)
        })
        .await?;
    Ok(rendered_response(StatusCode::OK, manifest.view(media)?))
}

/// DELETE /api/manifests/{name}: remove a manifest.
#[utoipa::path(
    delete,
    path = "/api/manifests/{name}",
    params(("name" = String, Path, description = "Manifest path below manifests/")),
    responses(
        (status = 204, description = "Manifest deleted"),
        (status = 404, description = "Manifest not found"),
    ),
    tag = "manifests"
)]
pub async fn delete_manifest(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    state
        .with_repo(move |repo| repo.delete_manifest(&name))
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
