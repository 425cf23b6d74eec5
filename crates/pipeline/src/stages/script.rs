use std::sync::Arc;

use autoreel_core::artifact::{Artifact, ArtifactKind, ArtifactMetadata, ArtifactStore};
use autoreel_core::error::{StageError, StageResult};
use autoreel_core::options::{ScriptLength, ScriptStyle};
use autoreel_core::providers::{ScriptGenerator, ScriptRequest};
use autoreel_core::validation::require_text;

use super::provider_failure;

#[derive(Debug, Clone)]
pub struct ScriptInput {
    pub topic: String,
    pub length: ScriptLength,
    pub style: ScriptStyle,
}

#[derive(Debug, Clone)]
pub struct ScriptOutput {
    pub artifact: Artifact,
    /// Text exactly as written to the artifact.
    pub content: String,
}

#[derive(Clone)]
pub struct ScriptStage {
    generator: Arc<dyn ScriptGenerator>,
    store: ArtifactStore,
}

impl ScriptStage {
    pub fn new(generator: Arc<dyn ScriptGenerator>, store: ArtifactStore) -> Self {
        Self { generator, store }
    }

    pub async fn run(&self, input: &ScriptInput) -> StageResult<ScriptOutput> {
        let topic = require_text("Topic", &input.topic)?;
        tracing::info!(
            topic,
            length = input.length.name(),
            style = input.style.name(),
            "Generating script",
        );

        let request = ScriptRequest {
            topic: topic.to_string(),
            length: input.length,
            style: input.style,
        };
        let content = self
            .generator
            .generate(&request)
            .await
            .map_err(|e| provider_failure(e, StageError::Generation))?;

        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(StageError::Generation(
                "service returned an empty script".into(),
            ));
        }

        let path = self
            .store
            .write(
                ArtifactKind::Script,
                topic,
                input.length.name(),
                "txt",
                content.as_bytes(),
            )
            .await?;
        tracing::info!(path = %path.display(), "Script saved");

        let artifact = Artifact::new(ArtifactKind::Script, path).with_metadata(ArtifactMetadata {
            duration_secs: None,
            size_bytes: Some(content.len() as u64),
        });
        Ok(ScriptOutput { artifact, content })
    }
}
