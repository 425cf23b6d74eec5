//! The five production stages.
//!
//! Every stage validates its input, calls exactly one provider (or the
//! encoder), writes one artifact and returns it. Provider failures are
//! converted to the stage's own [`StageError`] variant here; nothing is
//! retried.

pub mod animation;
pub mod script;
pub mod upload;
pub mod video_edit;
pub mod voice;

use std::sync::Arc;
use std::time::Duration;

use autoreel_core::artifact::ArtifactStore;
use autoreel_core::error::StageError;
use autoreel_core::providers::{
    AnimationService, MediaEncoder, ProviderError, ScriptGenerator, SpeechSynthesizer,
    VideoPublisher,
};

pub use animation::{AnimationInput, AnimationStage, PollConfig};
pub use script::{ScriptInput, ScriptOutput, ScriptStage};
pub use upload::{PublishedVideo, UploadInput, UploadStage};
pub use video_edit::{VideoEditInput, VideoEditStage};
pub use voice::{VoiceInput, VoiceStage};

/// One implementation per external dependency.
#[derive(Clone)]
pub struct Providers {
    pub script: Arc<dyn ScriptGenerator>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub animation: Arc<dyn AnimationService>,
    pub encoder: Arc<dyn MediaEncoder>,
    pub publisher: Arc<dyn VideoPublisher>,
}

/// Limits applied by the stages.
#[derive(Debug, Clone)]
pub struct StageSettings {
    pub max_text_length: usize,
    pub poll: PollConfig,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            max_text_length: crate::config::DEFAULT_MAX_TEXT_LENGTH,
            poll: PollConfig {
                interval: Duration::from_secs(5),
                timeout: Duration::from_secs(300),
            },
        }
    }
}

/// All stages, sharing one artifact store.
#[derive(Clone)]
pub struct Stages {
    pub script: ScriptStage,
    pub voice: VoiceStage,
    pub animation: AnimationStage,
    pub video_edit: VideoEditStage,
    pub upload: UploadStage,
    store: ArtifactStore,
}

impl Stages {
    pub fn new(providers: Providers, store: ArtifactStore, settings: StageSettings) -> Self {
        Self {
            script: ScriptStage::new(providers.script, store.clone()),
            voice: VoiceStage::new(
                providers.speech,
                Arc::clone(&providers.encoder),
                store.clone(),
                settings.max_text_length,
            ),
            animation: AnimationStage::new(providers.animation, store.clone(), settings.poll),
            video_edit: VideoEditStage::new(providers.encoder, store.clone()),
            upload: UploadStage::new(providers.publisher),
            store,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }
}

/// Convert a provider failure into the calling stage's error variant.
///
/// Missing or rejected server-side keys are a failure of that stage, not of
/// the caller, so they are wrapped like any other remote error. Only the
/// publish stage reports [`StageError::Auth`]; see [`publish_failure`].
/// Time limits keep their own kind in every stage.
pub(crate) fn provider_failure(err: ProviderError, wrap: fn(String) -> StageError) -> StageError {
    match err {
        ProviderError::Timeout { what, waited_secs } => StageError::Timeout { what, waited_secs },
        other => wrap(other.to_string()),
    }
}

/// Like [`provider_failure`] for the publish stage, where credential
/// problems keep their own kind.
pub(crate) fn publish_failure(err: ProviderError) -> StageError {
    match err {
        ProviderError::Auth(msg) => StageError::Auth(msg),
        other => provider_failure(other, StageError::Upload),
    }
}
