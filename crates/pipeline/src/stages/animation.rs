//! Animation stage: submit a render job, wait for it with a bounded poll
//! loop, download the finished asset.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use autoreel_core::artifact::{Artifact, ArtifactKind, ArtifactMetadata, ArtifactStore};
use autoreel_core::error::{StageError, StageResult};
use autoreel_core::options::{Resolution, VideoStyle};
use autoreel_core::providers::{AnimationJobStatus, AnimationRequest, AnimationService};
use autoreel_core::validation::require_text;

use super::provider_failure;

/// Frames per second requested from the animation service.
pub const ANIMATION_FPS: u32 = 24;

/// Clip length requested from the animation service.
pub const ANIMATION_DURATION_SECS: u32 = 10;

const PROMPT_SCRIPT_LINES: usize = 5;
const PROMPT_SUMMARY_CHARS: usize = 200;

/// Bounds of the completion wait.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Delay between status checks.
    pub interval: Duration,
    /// Total wait budget, measured from the first status check.
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AnimationInput {
    pub script: String,
    pub style: VideoStyle,
    pub resolution: Resolution,
}

/// Prompt built from the style and the opening lines of the script.
pub fn build_prompt(script: &str, style: VideoStyle) -> String {
    let summary = script
        .lines()
        .take(PROMPT_SCRIPT_LINES)
        .collect::<Vec<_>>()
        .join(" ");
    let summary: String = summary.trim().chars().take(PROMPT_SUMMARY_CHARS).collect();
    format!(
        "A {} animated video about: {summary}... \
         Colorful, vibrant, engaging visuals that match the content.",
        style.prompt()
    )
}

#[derive(Clone)]
pub struct AnimationStage {
    service: Arc<dyn AnimationService>,
    store: ArtifactStore,
    poll: PollConfig,
}

impl AnimationStage {
    pub fn new(service: Arc<dyn AnimationService>, store: ArtifactStore, poll: PollConfig) -> Self {
        Self {
            service,
            store,
            poll,
        }
    }

    pub async fn run(
        &self,
        input: &AnimationInput,
        cancel: &CancellationToken,
    ) -> StageResult<Artifact> {
        let script = require_text("Script", &input.script)?;
        let (width, height) = input.resolution.dimensions();
        let request = AnimationRequest {
            prompt: build_prompt(script, input.style),
            aspect_ratio: format!("{width}:{height}"),
            fps: ANIMATION_FPS,
            duration_secs: ANIMATION_DURATION_SECS,
        };

        let job_id = self
            .service
            .submit(&request)
            .await
            .map_err(|e| provider_failure(e, StageError::Animation))?;
        tracing::info!(job_id = %job_id, style = input.style.name(), "Animation job submitted");

        let asset_url = self.wait_for_completion(&job_id, cancel).await?;

        let bytes = self
            .service
            .download(&asset_url)
            .await
            .map_err(|e| provider_failure(e, StageError::Animation))?;
        if bytes.is_empty() {
            return Err(StageError::Animation(format!(
                "job {job_id} produced an empty asset"
            )));
        }

        let path = self
            .store
            .write(
                ArtifactKind::Animation,
                "",
                input.style.name(),
                "mp4",
                &bytes,
            )
            .await?;
        tracing::info!(path = %path.display(), "Animation saved");

        Ok(
            Artifact::new(ArtifactKind::Animation, path).with_metadata(ArtifactMetadata {
                duration_secs: Some(f64::from(ANIMATION_DURATION_SECS)),
                size_bytes: Some(bytes.len() as u64),
            }),
        )
    }

    /// Animate the contents of a script artifact.
    pub async fn run_from_script(
        &self,
        script: &Artifact,
        style: VideoStyle,
        resolution: Resolution,
        cancel: &CancellationToken,
    ) -> StageResult<Artifact> {
        script.ensure_ready(ArtifactKind::Script).await?;
        let text = script.read_text().await?;
        self.run(
            &AnimationInput {
                script: text,
                style,
                resolution,
            },
            cancel,
        )
        .await
    }

    /// Poll until the job completes, fails, the budget runs out, or
    /// `cancel` fires. Returns the asset URL.
    async fn wait_for_completion(
        &self,
        job_id: &str,
        cancel: &CancellationToken,
    ) -> StageResult<String> {
        let deadline = Instant::now() + self.poll.timeout;
        let timed_out = || StageError::Timeout {
            what: format!("animation job {job_id}"),
            waited_secs: self.poll.timeout.as_secs(),
        };
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let remaining = deadline.saturating_duration_since(Instant::now());

            let status = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(job_id, "Animation wait cancelled");
                    return Err(StageError::Cancelled(format!("animation job {job_id}")));
                }
                result = tokio::time::timeout(remaining, self.service.status(job_id)) => {
                    match result {
                        Ok(status) => status.map_err(|e| provider_failure(e, StageError::Animation))?,
                        Err(_) => return Err(timed_out()),
                    }
                }
            };

            match status {
                AnimationJobStatus::Completed { asset_url } => {
                    tracing::info!(job_id, attempt, "Animation job completed");
                    return Ok(asset_url);
                }
                AnimationJobStatus::Failed { reason } => {
                    tracing::warn!(job_id, reason = %reason, "Animation job failed");
                    return Err(StageError::Animation(reason));
                }
                AnimationJobStatus::Pending => {
                    tracing::debug!(job_id, attempt, "Animation job pending");
                }
            }

            if Instant::now() + self.poll.interval > deadline {
                return Err(timed_out());
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(job_id, "Animation wait cancelled");
                    return Err(StageError::Cancelled(format!("animation job {job_id}")));
                }
                _ = tokio::time::sleep(self.poll.interval) => {}
            }
        }
    }
}
