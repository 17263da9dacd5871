//! # Catalog Routes
//!
//! Read-only access to the generated catalogs.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use mrepo_core::view::render;
use mrepo_core::View;

use crate::error::AppError;
use crate::negotiate::{rendered_response, Accept};
use crate::state::AppState;

/// Build the catalogs router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/catalogs", get(list_catalogs))
        .route("/api/catalogs/{*name}", get(show_catalog))
}

/// GET /api/catalogs: names of the catalogs currently on disk.
#[utoipa::path(
    get,
    path = "/api/catalogs",
    responses((status = 200, description = "Sorted catalog names")),
    tag = "catalogs"
)]
pub async fn list_catalogs(
    State(state): State<AppState>,
    Accept(media): Accept,
) -> Result<Response, AppError> {
    let names = state.with_repo(|repo| repo.list_catalogs()).await?;
    Ok(rendered_response(StatusCode::OK, render(&names, media)?))
}

/// GET /api/catalogs/{name}: entries of one catalog.
#[utoipa::path(
    get,
    path = "/api/catalogs/{name}",
    params(("name" = String, Path, description = "Catalog name, e.g. `all`")),
    responses(
        (status = 200, description = "Catalog entries"),
        (status = 404, description = "Catalog not found"),
    ),
    tag = "catalogs"
)]
pub async fn show_catalog(
    State(state): State<AppState>,
    Accept(media): Accept,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let entries = state.with_repo(move |repo| repo.get_catalog(&name)).await?;
    Ok(rendered_response(StatusCode::OK, entries.view(media)?))
}
