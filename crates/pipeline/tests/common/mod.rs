//! Shared in-process fakes for the stage and orchestrator tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use autoreel_core::artifact::ArtifactStore;
use autoreel_core::providers::{
    AnimationJobStatus, AnimationRequest, AnimationService, EncodeJob, MediaEncoder,
    ProcessOutput, ProviderError, PublishMetadata, ScriptGenerator, ScriptRequest,
    SpeechRequest, SpeechSynthesizer, SynthesizedAudio, VideoPublisher,
};
use autoreel_pipeline::stages::PollConfig;
use autoreel_pipeline::{Providers, StageSettings, Stages};

/// A script of exactly `words` words.
pub fn script_of(words: usize) -> String {
    vec!["motivation"; words].join(" ")
}

// ---------------------------------------------------------------------------
// Script generator
// ---------------------------------------------------------------------------

pub struct MockGenerator {
    pub calls: AtomicUsize,
    pub reply: Result<String, u16>,
}

impl MockGenerator {
    pub fn replying(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply: Ok(text.into()),
        })
    }

    /// `401` fails as a missing API key; anything else as an API error.
    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply: Err(status),
        })
    }
}

#[async_trait]
impl ScriptGenerator for MockGenerator {
    async fn generate(&self, _request: &ScriptRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(401) => Err(ProviderError::Auth("OPENAI_API_KEY is not set".into())),
            Err(status) => Err(ProviderError::Api {
                status: *status,
                body: "upstream error".into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Speech synthesizer
// ---------------------------------------------------------------------------

pub struct MockSynthesizer {
    pub calls: AtomicUsize,
    pub last_text: Mutex<Option<String>>,
}

impl MockSynthesizer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            last_text: Mutex::new(None),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<SynthesizedAudio, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_text.lock().unwrap() = Some(request.text.clone());
        Ok(SynthesizedAudio {
            bytes: b"ID3\x03fake-mp3".to_vec(),
            duration_secs: Some(42.0),
        })
    }
}

// ---------------------------------------------------------------------------
// Animation service
// ---------------------------------------------------------------------------

pub enum AnimationBehaviour {
    /// Pending for `n` polls, then completed.
    CompletesAfter(usize),
    NeverCompletes,
    Fails(String),
}

pub struct MockAnimation {
    pub submits: AtomicUsize,
    pub polls: AtomicUsize,
    pub behaviour: AnimationBehaviour,
}

impl MockAnimation {
    pub fn new(behaviour: AnimationBehaviour) -> Arc<Self> {
        Arc::new(Self {
            submits: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
            behaviour,
        })
    }
}

#[async_trait]
impl AnimationService for MockAnimation {
    async fn submit(&self, _request: &AnimationRequest) -> Result<String, ProviderError> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        Ok("job-1".into())
    }

    async fn status(&self, _job_id: &str) -> Result<AnimationJobStatus, ProviderError> {
        let n = self.polls.fetch_add(1, Ordering::SeqCst);
        Ok(match &self.behaviour {
            AnimationBehaviour::CompletesAfter(pending) if n >= *pending => {
                AnimationJobStatus::Completed {
                    asset_url: "https://cdn.example/clip.mp4".into(),
                }
            }
            AnimationBehaviour::Fails(reason) => AnimationJobStatus::Failed {
                reason: reason.clone(),
            },
            _ => AnimationJobStatus::Pending,
        })
    }

    async fn download(&self, _asset_url: &str) -> Result<Vec<u8>, ProviderError> {
        Ok(b"\x00\x00\x00\x18ftypmp42".to_vec())
    }
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

pub struct MockEncoder {
    pub calls: AtomicUsize,
    /// `None` succeeds; `Some((code, stderr))` fails.
    pub failure: Option<(i32, String)>,
    /// Fails as if the process ran past its time limit.
    pub timed_out: bool,
    pub last_job: Mutex<Option<EncodeJob>>,
}

impl MockEncoder {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            failure: None,
            timed_out: false,
            last_job: Mutex::new(None),
        })
    }

    pub fn timing_out() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            failure: None,
            timed_out: true,
            last_job: Mutex::new(None),
        })
    }

    pub fn failing(code: i32, stderr: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            failure: Some((code, stderr.to_string())),
            timed_out: false,
            last_job: Mutex::new(None),
        })
    }
}

#[async_trait]
impl MediaEncoder for MockEncoder {
    async fn encode(&self, job: &EncodeJob) -> Result<ProcessOutput, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_job.lock().unwrap() = Some(job.clone());
        if self.timed_out {
            return Err(ProviderError::Timeout {
                what: "ffmpeg encode".into(),
                waited_secs: 900,
            });
        }
        match &self.failure {
            Some((code, stderr)) => Ok(ProcessOutput {
                success: false,
                exit_code: Some(*code),
                stderr: stderr.clone(),
            }),
            None => {
                tokio::fs::write(&job.output, b"merged-video").await.unwrap();
                Ok(ProcessOutput {
                    success: true,
                    exit_code: Some(0),
                    stderr: String::new(),
                })
            }
        }
    }

    async fn probe_duration(&self, _path: &Path) -> Option<f64> {
        Some(10.0)
    }
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

pub struct MockPublisher {
    pub calls: AtomicUsize,
    pub reject_auth: bool,
    pub last_title: Mutex<Option<String>>,
}

impl MockPublisher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reject_auth: false,
            last_title: Mutex::new(None),
        })
    }

    pub fn rejecting() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reject_auth: true,
            last_title: Mutex::new(None),
        })
    }
}

#[async_trait]
impl VideoPublisher for MockPublisher {
    async fn publish(
        &self,
        _video: &Path,
        metadata: &PublishMetadata,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_title.lock().unwrap() = Some(metadata.title.clone());
        if self.reject_auth {
            return Err(ProviderError::Auth("401: invalid credentials".into()));
        }
        Ok("vid123".into())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub dir: TempDir,
    pub generator: Arc<MockGenerator>,
    pub synthesizer: Arc<MockSynthesizer>,
    pub animation: Arc<MockAnimation>,
    pub encoder: Arc<MockEncoder>,
    pub publisher: Arc<MockPublisher>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            generator: MockGenerator::replying(script_of(200)),
            synthesizer: MockSynthesizer::new(),
            animation: MockAnimation::new(AnimationBehaviour::CompletesAfter(1)),
            encoder: MockEncoder::succeeding(),
            publisher: MockPublisher::new(),
        }
    }

    pub fn store(&self) -> ArtifactStore {
        ArtifactStore::new(self.dir.path().join("output"))
    }

    pub fn stages(&self) -> Stages {
        let providers = Providers {
            script: self.generator.clone(),
            speech: self.synthesizer.clone(),
            animation: self.animation.clone(),
            encoder: self.encoder.clone(),
            publisher: self.publisher.clone(),
        };
        let settings = StageSettings {
            max_text_length: 5000,
            poll: PollConfig {
                interval: Duration::from_millis(10),
                timeout: Duration::from_millis(100),
            },
        };
        Stages::new(providers, self.store(), settings)
    }
}
