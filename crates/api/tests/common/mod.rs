//! Test harness: the production router over in-process fakes.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use autoreel_api::config::ServerConfig;
use autoreel_api::router::build_app_router;
use autoreel_api::state::AppState;
use autoreel_core::artifact::ArtifactStore;
use autoreel_core::providers::{
    AnimationJobStatus, AnimationRequest, AnimationService, EncodeJob, MediaEncoder,
    ProcessOutput, ProviderError, PublishMetadata, ScriptGenerator, ScriptRequest,
    SpeechRequest, SpeechSynthesizer, SynthesizedAudio, VideoPublisher,
};
use autoreel_pipeline::stages::PollConfig;
use autoreel_pipeline::{Providers, StageSettings, Stages};

pub const MULTIPART_BOUNDARY: &str = "autoreel-test-boundary";

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Replies with a fixed script and counts calls.
pub struct CountingGenerator {
    pub calls: AtomicUsize,
    pub reply: String,
}

#[async_trait]
impl ScriptGenerator for CountingGenerator {
    async fn generate(&self, _request: &ScriptRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

pub struct CountingSynthesizer {
    pub calls: AtomicUsize,
}

#[async_trait]
impl SpeechSynthesizer for CountingSynthesizer {
    async fn synthesize(&self, _request: &SpeechRequest) -> Result<SynthesizedAudio, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(SynthesizedAudio {
            bytes: b"ID3\x03fake-mp3".to_vec(),
            duration_secs: Some(3.5),
        })
    }
}

/// Completes on the first poll.
pub struct InstantAnimation {
    pub submits: AtomicUsize,
}

#[async_trait]
impl AnimationService for InstantAnimation {
    async fn submit(&self, _request: &AnimationRequest) -> Result<String, ProviderError> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        Ok("job-1".into())
    }

    async fn status(&self, _job_id: &str) -> Result<AnimationJobStatus, ProviderError> {
        Ok(AnimationJobStatus::Completed {
            asset_url: "https://cdn.example/clip.mp4".into(),
        })
    }

    async fn download(&self, _asset_url: &str) -> Result<Vec<u8>, ProviderError> {
        Ok(b"animation-bytes".to_vec())
    }
}

/// Writes a stub output file, or fails with `stderr` when set.
pub struct StubEncoder {
    pub calls: AtomicUsize,
    pub fail_with: Option<String>,
    pub last_audio: std::sync::Mutex<Option<PathBuf>>,
}

#[async_trait]
impl MediaEncoder for StubEncoder {
    async fn encode(&self, job: &EncodeJob) -> Result<ProcessOutput, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_audio.lock().unwrap() = job.audio.clone();
        if let Some(stderr) = &self.fail_with {
            return Ok(ProcessOutput {
                success: false,
                exit_code: Some(1),
                stderr: stderr.clone(),
            });
        }
        tokio::fs::write(&job.output, b"merged").await.unwrap();
        Ok(ProcessOutput {
            success: true,
            exit_code: Some(0),
            stderr: String::new(),
        })
    }

    async fn probe_duration(&self, _path: &Path) -> Option<f64> {
        Some(10.0)
    }
}

pub struct UnusedPublisher;

#[async_trait]
impl VideoPublisher for UnusedPublisher {
    async fn publish(&self, _video: &Path, _metadata: &PublishMetadata) -> Result<String, ProviderError> {
        panic!("the HTTP surface never publishes");
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Everything a test may want to inspect after driving the app.
pub struct TestContext {
    pub dir: TempDir,
    pub generator: Arc<CountingGenerator>,
    pub synthesizer: Arc<CountingSynthesizer>,
    pub animation: Arc<InstantAnimation>,
    pub encoder: Arc<StubEncoder>,
}

impl TestContext {
    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    pub fn store(&self) -> ArtifactStore {
        ArtifactStore::new(self.output_dir())
    }
}

/// A script of exactly `words` words.
pub fn script_of(words: usize) -> String {
    vec!["focus"; words].join(" ")
}

/// Build a test `ServerConfig` whose front end lives in `dir/frontend`.
pub fn test_config(dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 1024 * 1024,
        frontend_dir: dir.join("frontend"),
    }
}

pub fn build_test_app() -> (Router, TestContext) {
    build_test_app_with_encoder(None)
}

/// Build the production router over fakes. `encoder_failure` makes the
/// encoder exit non-zero with that stderr.
pub fn build_test_app_with_encoder(encoder_failure: Option<&str>) -> (Router, TestContext) {
    let dir = TempDir::new().unwrap();
    let frontend = dir.path().join("frontend");
    std::fs::create_dir_all(&frontend).unwrap();
    std::fs::write(frontend.join("index.html"), "<html><body>autoreel</body></html>").unwrap();

    let ctx = TestContext {
        generator: Arc::new(CountingGenerator {
            calls: AtomicUsize::new(0),
            reply: script_of(200),
        }),
        synthesizer: Arc::new(CountingSynthesizer {
            calls: AtomicUsize::new(0),
        }),
        animation: Arc::new(InstantAnimation {
            submits: AtomicUsize::new(0),
        }),
        encoder: Arc::new(StubEncoder {
            calls: AtomicUsize::new(0),
            fail_with: encoder_failure.map(str::to_string),
            last_audio: std::sync::Mutex::new(None),
        }),
        dir,
    };

    let providers = Providers {
        script: ctx.generator.clone(),
        speech: ctx.synthesizer.clone(),
        animation: ctx.animation.clone(),
        encoder: ctx.encoder.clone(),
        publisher: Arc::new(UnusedPublisher),
    };
    let settings = StageSettings {
        max_text_length: 5000,
        poll: PollConfig {
            interval: Duration::from_millis(10),
            timeout: Duration::from_secs(1),
        },
    };
    let stages = Stages::new(providers, ctx.store(), settings);

    let config = test_config(ctx.dir.path());
    let state = AppState {
        stages: Arc::new(stages),
    };
    (build_app_router(state, &config), ctx)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// One part of a multipart body: `(name, Some(filename), bytes)` for files,
/// `(name, None, bytes)` for plain fields.
pub type Part<'a> = (&'a str, Option<&'a str>, &'a [u8]);

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, data) in parts {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(f) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                     Content-Type: text/plain\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(app: Router, uri: &str, parts: &[Part<'_>]) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
