//! Handlers for script generation and script upload.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use autoreel_core::options::{ScriptLength, ScriptStyle};
use autoreel_pipeline::stages::ScriptInput;

use crate::error::{AppError, AppResult};
use crate::handlers::{save_uploaded_script, UploadedFile};
use crate::response::{output_url, ApiResponse};
use crate::state::AppState;

/// Body of `POST /generate_script/`.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateScriptRequest {
    #[serde(default)]
    #[validate(length(max = 500, message = "Topic must be at most 500 characters"))]
    pub topic: String,
    pub length: Option<String>,
    pub style: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScriptGenerated {
    pub script_path: String,
    pub filename: String,
    pub script_content: String,
}

#[derive(Debug, Serialize)]
pub struct ScriptUploaded {
    pub script_path: String,
    pub filename: String,
}

/// POST /generate_script/
pub async fn generate_script(
    State(state): State<AppState>,
    payload: Result<Json<GenerateScriptRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<ScriptGenerated>>> {
    let Json(input) = payload?;
    input.validate()?;

    let output = state
        .stages
        .script
        .run(&ScriptInput {
            topic: input.topic,
            length: input
                .length
                .as_deref()
                .map(ScriptLength::from_name)
                .unwrap_or_default(),
            style: input
                .style
                .as_deref()
                .map(ScriptStyle::from_name)
                .unwrap_or_default(),
        })
        .await?;

    let filename = output.artifact.file_name();
    Ok(Json(ApiResponse::success(
        "Script generated successfully",
        ScriptGenerated {
            script_path: output_url(&filename),
            filename,
            script_content: output.content,
        },
    )))
}

/// POST /upload_script/
///
/// Multipart form with a required `script_file` field (`.txt` or `.md`).
pub async fn upload_script(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<ScriptUploaded>>> {
    let mut script_file: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("script_file") {
            let filename = field.file_name().unwrap_or("script.txt").to_string();
            let data = field.bytes().await?;
            script_file = Some(UploadedFile {
                filename,
                data: data.to_vec(),
            });
        }
    }

    let file = script_file
        .ok_or_else(|| AppError::BadRequest("Missing required 'script_file' field".into()))?;
    let artifact = save_uploaded_script(state.store(), &file).await?;

    let filename = artifact.file_name();
    Ok(Json(ApiResponse::success(
        "Script uploaded successfully",
        ScriptUploaded {
            script_path: output_url(&filename),
            filename,
        },
    )))
}
