use std::sync::Arc;

use serde::Serialize;

use autoreel_core::artifact::{Artifact, ArtifactKind};
use autoreel_core::error::StageResult;
use autoreel_core::options::Visibility;
use autoreel_core::providers::{PublishMetadata, VideoPublisher};
use autoreel_core::validation::{require_max_chars, require_text};

use super::publish_failure;

/// Platform limit on title length.
pub const MAX_TITLE_CHARS: usize = 100;

/// Platform limit on description length.
pub const MAX_DESCRIPTION_CHARS: usize = 5000;

#[derive(Debug, Clone)]
pub struct UploadInput {
    pub video: Artifact,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub visibility: Visibility,
}

/// The remote publication record.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedVideo {
    pub video_id: String,
    pub url: String,
}

#[derive(Clone)]
pub struct UploadStage {
    publisher: Arc<dyn VideoPublisher>,
}

impl UploadStage {
    pub fn new(publisher: Arc<dyn VideoPublisher>) -> Self {
        Self { publisher }
    }

    pub async fn run(&self, input: &UploadInput) -> StageResult<PublishedVideo> {
        let title = require_text("Title", &input.title)?;
        require_max_chars("Title", title, MAX_TITLE_CHARS)?;
        require_max_chars("Description", &input.description, MAX_DESCRIPTION_CHARS)?;
        input.video.ensure_ready(ArtifactKind::MergedVideo).await?;

        let metadata = PublishMetadata {
            title: title.to_string(),
            description: input.description.trim().to_string(),
            tags: input.tags.clone(),
            visibility: input.visibility,
        };
        tracing::info!(
            path = %input.video.path.display(),
            visibility = input.visibility.privacy_status(),
            "Uploading video",
        );

        let video_id = self
            .publisher
            .publish(&input.video.path, &metadata)
            .await
            .map_err(publish_failure)?;
        tracing::info!(video_id = %video_id, "Video published");

        Ok(PublishedVideo {
            url: format!("https://www.youtube.com/watch?v={video_id}"),
            video_id,
        })
    }
}
