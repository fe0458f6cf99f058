//! Stored blob serving (vouchers and profile pictures)

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::{error::AppResult, AppState};

/// Serve a stored file back.
///
/// Unauthenticated so profile pictures work in plain `<img>` tags; the path
/// is confined to the upload root.
#[utoipa::path(
    get,
    path = "/files/{path}",
    tag = "files",
    params(
        ("path" = String, Path, description = "Stored path as returned by an upload")
    ),
    responses(
        (status = 200, description = "File contents"),
        (status = 400, description = "Path escapes the upload root"),
        (status = 404, description = "File not found")
    )
)]
pub async fn serve_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> AppResult<impl IntoResponse> {
    let (bytes, content_type) = state.services.storage.open(&path).await?;
    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}
