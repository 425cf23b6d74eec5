//! Artifact listing and deletion.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use autoreel_core::artifact::ArtifactEntry;

use crate::error::AppResult;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OutputListing {
    pub files: Vec<ArtifactEntry>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct FileDeleted {
    pub filename: String,
}

/// GET /list_outputs/
pub async fn list_outputs(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<OutputListing>>> {
    let files = state.store().list().await?;
    let count = files.len();
    Ok(Json(ApiResponse::success(
        format!("Found {count} files"),
        OutputListing { files, count },
    )))
}

/// DELETE /delete_file/{filename}
///
/// Only plain file names inside the output directory are accepted; anything
/// else is rejected before the filesystem is touched.
pub async fn delete_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<Json<ApiResponse<FileDeleted>>> {
    state.store().delete(&filename).await?;
    Ok(Json(ApiResponse::success(
        format!("File {filename} deleted successfully"),
        FileDeleted { filename },
    )))
}
