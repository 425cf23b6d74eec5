use std::sync::Arc;

use autoreel_core::artifact::{Artifact, ArtifactKind, ArtifactMetadata, ArtifactStore};
use autoreel_core::error::{StageError, StageResult};
use autoreel_core::options::{Resolution, VideoStyle};
use autoreel_core::providers::{EncodeJob, MediaEncoder, ProviderError};

/// Keep the tail of the encoder's stderr; the cause is at the end.
const MAX_DIAGNOSTIC_CHARS: usize = 4000;

#[derive(Debug, Clone)]
pub struct VideoEditInput {
    pub video: Artifact,
    /// Voice track to merge. Without one the video is re-encoded silent.
    pub audio: Option<Artifact>,
    pub resolution: Resolution,
    pub style: VideoStyle,
}

#[derive(Clone)]
pub struct VideoEditStage {
    encoder: Arc<dyn MediaEncoder>,
    store: ArtifactStore,
}

impl VideoEditStage {
    pub fn new(encoder: Arc<dyn MediaEncoder>, store: ArtifactStore) -> Self {
        Self { encoder, store }
    }

    pub async fn run(&self, input: &VideoEditInput) -> StageResult<Artifact> {
        input.video.ensure_ready(ArtifactKind::Animation).await?;
        if let Some(audio) = &input.audio {
            audio.ensure_ready(ArtifactKind::Voice).await?;
        }

        let output = self
            .store
            .reserve(
                ArtifactKind::MergedVideo,
                input.style.name(),
                input.resolution.name(),
                "mp4",
            )
            .await?;
        let (width, height) = input.resolution.dimensions();
        let job = EncodeJob {
            video: input.video.path.clone(),
            audio: input.audio.as_ref().map(|a| a.path.clone()),
            output: output.clone(),
            width,
            height,
            grade_filter: Some(input.style.grade_filter().to_string()),
        };

        tracing::info!(
            video = %job.video.display(),
            has_audio = job.audio.is_some(),
            resolution = input.resolution.name(),
            "Encoding video",
        );
        let result = self
            .encoder
            .encode(&job)
            .await
            .map_err(|e| match e {
                ProviderError::Timeout { what, waited_secs } => {
                    StageError::Timeout { what, waited_secs }
                }
                other => StageError::Encoding {
                    exit_code: None,
                    diagnostics: other.to_string(),
                },
            })?;

        if !result.success {
            tracing::error!(exit_code = ?result.exit_code, "Encoder failed");
            return Err(StageError::Encoding {
                exit_code: result.exit_code,
                diagnostics: diagnostics_tail(&result.stderr),
            });
        }

        let size_bytes = match tokio::fs::metadata(&output).await {
            Ok(meta) if meta.len() > 0 => meta.len(),
            _ => {
                return Err(StageError::Encoding {
                    exit_code: result.exit_code,
                    diagnostics: format!(
                        "encoder reported success but {} is missing or empty",
                        output.display()
                    ),
                })
            }
        };
        let duration_secs = self.encoder.probe_duration(&output).await;
        tracing::info!(path = %output.display(), size_bytes, ?duration_secs, "Video saved");

        Ok(
            Artifact::new(ArtifactKind::MergedVideo, output).with_metadata(ArtifactMetadata {
                duration_secs,
                size_bytes: Some(size_bytes),
            }),
        )
    }
}

fn diagnostics_tail(stderr: &str) -> String {
    let trimmed = stderr.trim();
    let count = trimmed.chars().count();
    if count <= MAX_DIAGNOSTIC_CHARS {
        return trimmed.to_string();
    }
    trimmed.chars().skip(count - MAX_DIAGNOSTIC_CHARS).collect()
}
