use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use autoreel_core::options::{VoiceSpeed, VoiceType};
use autoreel_pipeline::stages::VoiceInput;

use crate::error::AppResult;
use crate::response::{output_url, ApiResponse};
use crate::state::AppState;

/// `speed` may be a preset name (`"fast"`) or a number (`1.1`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SpeedParam {
    Number(f32),
    Name(String),
}

impl SpeedParam {
    fn resolve(&self) -> VoiceSpeed {
        match self {
            Self::Number(v) => VoiceSpeed::from_name(&v.to_string()),
            Self::Name(name) => VoiceSpeed::from_name(name),
        }
    }
}

/// Body of `POST /generate_voice/`.
#[derive(Debug, Deserialize)]
pub struct GenerateVoiceRequest {
    #[serde(default)]
    pub text: String,
    pub voice_type: Option<String>,
    pub speed: Option<SpeedParam>,
}

#[derive(Debug, Serialize)]
pub struct VoiceGenerated {
    pub voice_path: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// POST /generate_voice/
pub async fn generate_voice(
    State(state): State<AppState>,
    payload: Result<Json<GenerateVoiceRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<VoiceGenerated>>> {
    let Json(input) = payload?;

    let artifact = state
        .stages
        .voice
        .run(&VoiceInput {
            text: input.text,
            voice: input
                .voice_type
                .as_deref()
                .map(VoiceType::from_name)
                .unwrap_or_default(),
            speed: input
                .speed
                .as_ref()
                .map(SpeedParam::resolve)
                .unwrap_or_default(),
        })
        .await?;

    let filename = artifact.file_name();
    Ok(Json(ApiResponse::success(
        "Voice generated successfully",
        VoiceGenerated {
            voice_path: output_url(&filename),
            filename,
            duration: artifact.metadata.duration_secs,
        },
    )))
}
