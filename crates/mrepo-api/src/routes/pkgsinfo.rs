//! # Pkgsinfo Routes
//!
//! CRUD over `pkgsinfo/`. Every successful write schedules a catalog
//! rebuild inside the repository; responses do not wait for it.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use mrepo_core::{PkgsInfo, PkgsInfoCollection, View};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::AppError;
use crate::extractors::Payload;
use crate::negotiate::{rendered_response, Accept};
use crate::routes::create_record;
use crate::state::AppState;

/// Query filters for the pkgsinfo list.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PkgsinfoFilter {
    /// Comma-separated catalog names; keeps records in any of them.
    pub catalogs: Option<String>,
    /// Keeps records whose `name` matches exactly.
    pub name: Option<String>,
}

impl PkgsinfoFilter {
    /// Narrow `infos` by catalog membership, then by name.
    pub fn apply(&self, mut infos: PkgsInfoCollection) -> PkgsInfoCollection {
        if let Some(catalogs) = &self.catalogs {
            let wanted: Vec<&str> = catalogs.split(',').collect();
            infos = infos.by_catalog(&wanted);
        }
        if let Some(name) = &self.name {
            infos = infos.by_name(name);
        }
        infos
    }
}

/// Build the pkgsinfo router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/pkgsinfo", get(list_pkgsinfo).post(create_pkgsinfo))
        .route(
            "/api/pkgsinfo/{*name}",
            get(show_pkgsinfo)
                .put(replace_pkgsinfo)
                .delete(delete_pkgsinfo),
        )
}

/// GET /api/pkgsinfo: list pkgsinfos, optionally filtered.
#[utoipa::path(
    get,
    path = "/api/pkgsinfo",
    params(PkgsinfoFilter),
    responses(
        (status = 200, description = "Matching pkgsinfos, each with its filename"),
    ),
    tag = "pkgsinfo"
)]
pub async fn list_pkgsinfo(
    State(state): State<AppState>,
    Accept(media): Accept,
    Query(filter): Query<PkgsinfoFilter>,
) -> Result<Response, AppError> {
    let infos = state.with_repo(|repo| repo.list_pkgsinfos()).await?;
    let infos = filter.apply(infos);
    Ok(rendered_response(StatusCode::OK, infos.view(media)?))
}

/// GET /api/pkgsinfo/{name}: fetch one pkgsinfo.
#[utoipa::path(
    get,
    path = "/api/pkgsinfo/{name}",
    params(("name" = String, Path, description = "Pkgsinfo path below pkgsinfo/")),
    responses(
        (status = 200, description = "Pkgsinfo found"),
        (status = 404, description = "Pkgsinfo not found"),
    ),
    tag = "pkgsinfo"
)]
pub async fn show_pkgsinfo(
    State(state): State<AppState>,
    Accept(media): Accept,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let info = state.with_repo(move |repo| repo.get_pkgsinfo(&name)).await?;
    Ok(rendered_response(StatusCode::OK, info.view(media)?))
}

/// POST /api/pkgsinfo: create a pkgsinfo from a body carrying `filename`.
#[utoipa::path(
    post,
    path = "/api/pkgsinfo",
    responses(
        (status = 201, description = "Pkgsinfo created"),
        (status = 400, description = "Malformed payload or missing filename"),
        (status = 409, description = "A pkgsinfo with that filename already exists"),
    ),
    tag = "pkgsinfo"
)]
pub async fn create_pkgsinfo(
    State(state): State<AppState>,
    Accept(media): Accept,
    payload: Payload,
) -> Result<Response, AppError> {
    let info: PkgsInfo = payload.decode_new()?;
    let info = state
        .with_repo(move |repo| create_record(repo, info))
        .await?;
    tracing::info!(pkgsinfo = %info.filename, "created pkgsinfo");
    Ok(rendered_response(StatusCode::CREATED, info.view(media)?))
}

/// PUT /api/pkgsinfo/{name}: replace a pkgsinfo with the submitted body.
#[utoipa::path(
    put,
    path = "/api/pkgsinfo/{name}",
    params(("name" = String, Path, description = "Pkgsinfo path below pkgsinfo/")),
    responses(
        (status = 200, description = "Pkgsinfo replaced"),
        (status = 400, description = "Malformed payload"),
        (status = 404, description = "Pkgsinfo not found"),
    ),
    tag = "pkgsinfo"
)]
pub async fn replace_pkgsinfo(
    State(state): State<AppState>,
    Accept(media): Accept,
    Path(name): Path<String>,
    payload: Payload,
) -> Result<Response, AppError> {
    let mut info: PkgsInfo = payload.decode()?;
    info.filename = name;
    let info = state
        .with_repo(move |repo| repo.save_pkgsinfo(&info).map(|()| info))
        .await?;
    Ok(rendered_response(StatusCode::OK, info.view(media)?))
}

/// DELETE /api/pkgsinfo/{name}: remove a pkgsinfo.
#[utoipa::path(
    delete,
    path = "/api/pkgsinfo/{name}",
    params(("name" = String, Path, description = "Pkgsinfo path below pkgsinfo/")),
    responses(
        (status = 204, description = "Pkgsinfo deleted"),
        (status = 404, description = "Pkgsinfo not found"),
    ),
    tag = "pkgsinfo"
)]
pub async fn delete_pkgsinfo(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    state
        .with_repo(move |repo| repo.delete_pkgsinfo(&name))
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
