use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use autoreel_core::artifact::{Artifact, ArtifactKind};
use autoreel_core::options::{Resolution, VideoStyle};
use autoreel_pipeline::stages::VideoEditInput;

use crate::error::{AppError, AppResult};
use crate::handlers::{save_uploaded_script, UploadedFile};
use crate::response::{output_url, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct VideoCreated {
    pub video_path: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Size of the encoded file in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// POST /create_video/
///
/// Multipart form:
/// - `script_file` (required): `.txt`/`.md` script to animate
/// - `style`, `resolution` (optional)
/// - `voice_file` (optional): name of an audio artifact in the output
///   directory to merge as the soundtrack
///
/// Responds with `{video_path, filename, duration?, size?}`.
///
/// Renders an animation from the script, then encodes it at the requested
/// resolution with the style's grade.
pub async fn create_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<VideoCreated>>> {
    let mut script_file: Option<UploadedFile> = None;
    let mut style = VideoStyle::default();
    let mut resolution = Resolution::default();
    let mut voice_file: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "script_file" => {
                let filename = field.file_name().unwrap_or("script.txt").to_string();
                let data = field.bytes().await?;
                script_file = Some(UploadedFile {
                    filename,
                    data: data.to_vec(),
                });
            }
            "style" => style = VideoStyle::from_name(&field.text().await?),
            "resolution" => resolution = Resolution::from_name(&field.text().await?),
            "voice_file" => {
                let text = field.text().await?;
                voice_file = Some(text.trim().to_string()).filter(|s| !s.is_empty());
            }
            _ => {} // ignore unknown fields
        }
    }

    let file = script_file
        .ok_or_else(|| AppError::BadRequest("Missing required 'script_file' field".into()))?;

    // Resolve the soundtrack before any remote work starts.
    let audio = match voice_file {
        Some(name) => {
            let path = state.store().resolve(&name).await?;
            Some(Artifact::new(ArtifactKind::Voice, path))
        }
        None => None,
    };

    let script = save_uploaded_script(state.store(), &file).await?;

    let animation = state
        .stages
        .animation
        .run_from_script(&script, style, resolution, &CancellationToken::new())
        .await?;

    let video = state
        .stages
        .video_edit
        .run(&VideoEditInput {
            video: animation,
            audio,
            resolution,
            style,
        })
        .await?;

    let filename = video.file_name();
    Ok(Json(ApiResponse::success(
        "Video created successfully",
        VideoCreated {
            video_path: output_url(&filename),
            filename,
            duration: video.metadata.duration_secs,
            size: video.metadata.size_bytes,
        },
    )))
}
