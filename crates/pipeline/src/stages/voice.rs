use std::sync::Arc;

use autoreel_core::artifact::{Artifact, ArtifactKind, ArtifactMetadata, ArtifactStore};
use autoreel_core::error::{StageError, StageResult};
use autoreel_core::options::{VoiceSpeed, VoiceType};
use autoreel_core::providers::{MediaEncoder, SpeechRequest, SpeechSynthesizer};
use autoreel_core::validation::{require_max_chars, require_text};

use super::provider_failure;

#[derive(Debug, Clone)]
pub struct VoiceInput {
    pub text: String,
    pub voice: VoiceType,
    pub speed: VoiceSpeed,
}

#[derive(Clone)]
pub struct VoiceStage {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    encoder: Arc<dyn MediaEncoder>,
    store: ArtifactStore,
    max_text_length: usize,
}

impl VoiceStage {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        encoder: Arc<dyn MediaEncoder>,
        store: ArtifactStore,
        max_text_length: usize,
    ) -> Self {
        Self {
            synthesizer,
            encoder,
            store,
            max_text_length,
        }
    }

    pub async fn run(&self, input: &VoiceInput) -> StageResult<Artifact> {
        let text = require_text("Text", &input.text)?;
        require_max_chars("Text", &input.text, self.max_text_length)?;
        tracing::info!(
            chars = text.chars().count(),
            voice = input.voice.name(),
            speed = input.speed.value(),
            "Synthesizing voice",
        );

        let request = SpeechRequest {
            text: text.to_string(),
            voice: input.voice,
            speed: input.speed,
        };
        let audio = self
            .synthesizer
            .synthesize(&request)
            .await
            .map_err(|e| provider_failure(e, StageError::Synthesis))?;
        if audio.bytes.is_empty() {
            return Err(StageError::Synthesis("service returned no audio".into()));
        }

        let slug_source: String = text.chars().take(30).collect();
        let path = self
            .store
            .write(
                ArtifactKind::Voice,
                &slug_source,
                input.voice.name(),
                "mp3",
                &audio.bytes,
            )
            .await?;

        let duration_secs = match audio.duration_secs {
            Some(d) => Some(d),
            None => self.encoder.probe_duration(&path).await,
        };
        tracing::info!(path = %path.display(), ?duration_secs, "Voice saved");

        Ok(Artifact::new(ArtifactKind::Voice, path).with_metadata(ArtifactMetadata {
            duration_secs,
            size_bytes: Some(audio.bytes.len() as u64),
        }))
    }

    /// Voice the contents of a script artifact.
    pub async fn run_from_script(
        &self,
        script: &Artifact,
        voice: VoiceType,
        speed: VoiceSpeed,
    ) -> StageResult<Artifact> {
        script.ensure_ready(ArtifactKind::Script).await?;
        let text = script.read_text().await?;
        self.run(&VoiceInput { text, voice, speed }).await
    }
}
