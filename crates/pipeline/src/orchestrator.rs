//! Runs the five stages in order, handing each stage's artifact to the
//! next. The first failure aborts the run; artifacts already written stay
//! on disk.

use std::fmt;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use autoreel_core::artifact::Artifact;
use autoreel_core::error::StageError;
use autoreel_core::options::{
    Resolution, ScriptLength, ScriptStyle, VideoStyle, Visibility, VoiceSpeed, VoiceType,
};

use crate::stages::{PublishedVideo, ScriptInput, Stages, UploadInput, VideoEditInput};

/// Characters of the script used as the default description.
const DEFAULT_DESCRIPTION_CHARS: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Script,
    Voice,
    Animation,
    VideoEdit,
    Upload,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Script => "script",
            Self::Voice => "voice",
            Self::Animation => "animation",
            Self::VideoEdit => "video-edit",
            Self::Upload => "upload",
        })
    }
}

/// A run aborted at `stage`.
#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: StageKind,
    #[source]
    pub source: StageError,
}

trait AtStage<T> {
    fn at(self, stage: StageKind) -> Result<T, PipelineError>;
}

impl<T> AtStage<T> for Result<T, StageError> {
    fn at(self, stage: StageKind) -> Result<T, PipelineError> {
        self.map_err(|source| {
            tracing::error!(stage = %stage, error = %source, "Pipeline aborted");
            PipelineError { stage, source }
        })
    }
}

/// Everything one run needs.
#[derive(Debug, Clone, Default)]
pub struct PipelineRequest {
    pub topic: String,
    pub length: ScriptLength,
    pub style: ScriptStyle,
    pub voice: VoiceType,
    pub speed: VoiceSpeed,
    pub video_style: VideoStyle,
    pub resolution: Resolution,
    /// Defaults to the topic.
    pub title: Option<String>,
    /// Defaults to the opening of the script.
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub visibility: Visibility,
}

/// Every artifact of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub script: Artifact,
    pub voice: Artifact,
    pub animation: Artifact,
    pub video: Artifact,
    pub published: PublishedVideo,
}

#[derive(Clone)]
pub struct Pipeline {
    stages: Stages,
}

impl Pipeline {
    pub fn new(stages: Stages) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &Stages {
        &self.stages
    }

    /// Run script → voice → animation → video-edit → upload.
    pub async fn run(
        &self,
        request: &PipelineRequest,
        cancel: &CancellationToken,
    ) -> Result<PipelineReport, PipelineError> {
        tracing::info!(topic = %request.topic, "Pipeline started");

        let script = self
            .stages
            .script
            .run(&ScriptInput {
                topic: request.topic.clone(),
                length: request.length,
                style: request.style,
            })
            .await
            .at(StageKind::Script)?;
        tracing::info!(path = %script.artifact.path.display(), "Stage 1/5 complete");

        let voice = self
            .stages
            .voice
            .run_from_script(&script.artifact, request.voice, request.speed)
            .await
            .at(StageKind::Voice)?;
        tracing::info!(path = %voice.path.display(), "Stage 2/5 complete");

        let animation = self
            .stages
            .animation
            .run_from_script(
                &script.artifact,
                request.video_style,
                request.resolution,
                cancel,
            )
            .await
            .at(StageKind::Animation)?;
        tracing::info!(path = %animation.path.display(), "Stage 3/5 complete");

        let video = self
            .stages
            .video_edit
            .run(&VideoEditInput {
                video: animation.clone(),
                audio: Some(voice.clone()),
                resolution: request.resolution,
                style: request.video_style,
            })
            .await
            .at(StageKind::VideoEdit)?;
        tracing::info!(path = %video.path.display(), "Stage 4/5 complete");

        let title = request
            .title
            .clone()
            .unwrap_or_else(|| request.topic.trim().to_string());
        let description = request.description.clone().unwrap_or_else(|| {
            script
                .content
                .chars()
                .take(DEFAULT_DESCRIPTION_CHARS)
                .collect()
        });
        let published = self
            .stages
            .upload
            .run(&UploadInput {
                video: video.clone(),
                title,
                description,
                tags: request.tags.clone(),
                visibility: request.visibility,
            })
            .await
            .at(StageKind::Upload)?;
        tracing::info!(video_id = %published.video_id, "Pipeline complete");

        Ok(PipelineReport {
            script: script.artifact,
            voice,
            animation,
            video,
            published,
        })
    }
}
