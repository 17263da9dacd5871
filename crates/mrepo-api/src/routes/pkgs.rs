//! # Package Routes
//!
//! Upload and removal of installer binaries under `pkgs/`. Uploads are a
//! multipart form with a `filename` text field and a `filedata` file field.
//! Existing packages are never overwritten.

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, post};
use axum::Router;
use mrepo_core::view::render;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::negotiate::{rendered_response, Accept};
use crate::state::AppState;

/// Multipart body accepted by `POST /api/pkgs`.
#[derive(Debug, ToSchema)]
pub struct PkgUpload {
    /// Destination path below `pkgs/`.
    pub filename: String,
    /// The package content.
    #[schema(value_type = String, format = Binary)]
    pub filedata: Vec<u8>,
}

/// Build the pkgs router.
///
/// Package binaries routinely exceed the default request body limit, so it
/// is lifted for these routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/pkgs", post(upload_pkg))
        .route("/api/pkgs/{*name}", delete(delete_pkg))
        .layer(DefaultBodyLimit::disable())
}

async fn read_upload(mut multipart: Multipart) -> Result<PkgUpload, AppError> {
    let mut filename = None;
    let mut filedata = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("filename") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("invalid filename field: {e}")))?;
                filename = Some(text);
            }
            Some("filedata") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("invalid filedata field: {e}")))?;
                filedata = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let filename = filename
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::BadRequest("upload form must contain a filename key".into()))?;
    let filedata = filedata
        .ok_or_else(|| AppError::BadRequest("filedata must contain a file".into()))?;
    Ok(PkgUpload { filename, filedata })
}

/// POST /api/pkgs: store a package binary.
#[utoipa::path(
    post,
    path = "/api/pkgs",
    request_body(content = PkgUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Package stored; body carries filename, size, and sha256"),
        (status = 400, description = "Missing filename or filedata"),
        (status = 409, description = "A package with that filename already exists"),
    ),
    tag = "pkgs"
)]
pub async fn upload_pkg(
    State(state): State<AppState>,
    Accept(media): Accept,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let PkgUpload { filename, filedata } = read_upload(multipart).await?;
    let receipt = state
        .with_repo(move |repo| repo.add_pkg(&filename, filedata.as_slice()))
        .await?;
    Ok(rendered_response(StatusCode::CREATED, render(&receipt, media)?))
}

/// DELETE /api/pkgs/{name}: remove a package binary.
#[utoipa::path(
    delete,
    path = "/api/pkgs/{name}",
    params(("name" = String, Path, description = "Package path below pkgs/")),
    responses(
        (status = 204, description = "Package deleted"),
        (status = 404, description = "Package not found"),
    ),
    tag = "pkgs"
)]
pub async fn delete_pkg(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    state.with_repo(move |repo| repo.delete_pkg(&name)).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
