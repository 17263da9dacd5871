//! # Raw Repository Files
//!
//! `GET /repo/{path}` is what munki clients fetch: catalogs, manifests,
//! pkgsinfos, and packages, byte for byte, through the configured
//! [`FileSource`](mrepo_store::FileSource).

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

/// Build the raw file router.
pub fn router() -> Router<AppState> {
    Router::new().route("/repo/{*path}", get(serve_file))
}

/// GET /repo/{path}: raw file content.
#[utoipa::path(
    get,
    path = "/repo/{path}",
    params(("path" = String, Path, description = "Path relative to the repository root")),
    responses(
        (status = 200, description = "File content"),
        (status = 401, description = "Basic auth required"),
        (status = 404, description = "No such file"),
    ),
    tag = "repo"
)]
pub async fn serve_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, AppError> {
    let files = state.files.clone();
    let data = tokio::task::spawn_blocking(move || files.read(&path))
        .await
        .map_err(|e| AppError::Internal(format!("file task failed: {e}")))??;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/octet-stream")],
        data,
    )
        .into_response())
}
