//! Seams between the pipeline stages and the outside world.
//!
//! Each remote service and the local encoder sit behind a trait so the
//! stages can be exercised against in-process fakes. Implementations
//! report transport-level failures as [`ProviderError`]; the stages decide
//! which [`StageError`](crate::error::StageError) variant that becomes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::options::{ScriptLength, ScriptStyle, Visibility, VoiceSpeed, VoiceType};

/// Failure talking to an external service or process.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Connection, DNS or body-read failure.
    #[error("request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {body}")]
    Api { status: u16, body: String },

    /// Credentials were missing or rejected.
    #[error("not authorized: {0}")]
    Auth(String),

    /// The service answered 2xx but the payload was not what we expected.
    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    /// A local tool could not be started.
    #[error("process error: {0}")]
    Process(String),

    /// A request or local process ran past its time limit.
    #[error("{what} did not finish within {waited_secs}s")]
    Timeout { what: String, waited_secs: u64 },
}

// ---------------------------------------------------------------------------
// Script generation
// ---------------------------------------------------------------------------

/// Parameters for one script-generation request.
#[derive(Debug, Clone)]
pub struct ScriptRequest {
    pub topic: String,
    pub length: ScriptLength,
    pub style: ScriptStyle,
}

#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    /// Return the generated script text.
    async fn generate(&self, request: &ScriptRequest) -> Result<String, ProviderError>;
}

// ---------------------------------------------------------------------------
// Speech synthesis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: VoiceType,
    pub speed: VoiceSpeed,
}

/// Encoded audio returned by a synthesizer.
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub bytes: Vec<u8>,
    /// Set when the service reports the length of the clip.
    pub duration_secs: Option<f64>,
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<SynthesizedAudio, ProviderError>;
}

// ---------------------------------------------------------------------------
// Animation
// ---------------------------------------------------------------------------

/// Parameters of an animation job.
#[derive(Debug, Clone)]
pub struct AnimationRequest {
    pub prompt: String,
    /// `"W:H"`, e.g. `"16:9"`.
    pub aspect_ratio: String,
    pub fps: u32,
    pub duration_secs: u32,
}

/// State of a submitted animation job.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationJobStatus {
    Pending,
    Completed { asset_url: String },
    Failed { reason: String },
}

/// Asynchronous remote rendering: submit, poll, then fetch the asset.
#[async_trait]
pub trait AnimationService: Send + Sync {
    /// Submit a job and return its identifier.
    async fn submit(&self, request: &AnimationRequest) -> Result<String, ProviderError>;

    async fn status(&self, job_id: &str) -> Result<AnimationJobStatus, ProviderError>;

    async fn download(&self, asset_url: &str) -> Result<Vec<u8>, ProviderError>;
}

// ---------------------------------------------------------------------------
// Local encoding
// ---------------------------------------------------------------------------

/// One encode invocation.
#[derive(Debug, Clone)]
pub struct EncodeJob {
    pub video: PathBuf,
    pub audio: Option<PathBuf>,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Extra filter appended after scaling, e.g. a colour grade.
    pub grade_filter: Option<String>,
}

/// Captured result of running the encoder.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stderr: String,
}

#[async_trait]
pub trait MediaEncoder: Send + Sync {
    /// Run the encoder to completion. A tool that ran but failed is reported
    /// through [`ProcessOutput::success`], not as an `Err`.
    async fn encode(&self, job: &EncodeJob) -> Result<ProcessOutput, ProviderError>;

    /// Duration of a media file in seconds, if it can be determined.
    async fn probe_duration(&self, path: &Path) -> Option<f64>;
}

// ---------------------------------------------------------------------------
// Publication
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PublishMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub visibility: Visibility,
}

#[async_trait]
pub trait VideoPublisher: Send + Sync {
    /// Transfer the file and return the platform's identifier for it.
    async fn publish(&self, video: &Path, metadata: &PublishMetadata)
        -> Result<String, ProviderError>;
}
