use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use autoreel_core::artifact::ArtifactStore;
use autoreel_core::ffmpeg::{self, FfmpegEncoder};
use autoreel_services::{
    elevenlabs, openai, pika, youtube, ElevenLabsSynthesizer, OpenAiScriptGenerator,
    PikaAnimationService, YoutubePublisher, DEFAULT_REQUEST_TIMEOUT,
};

use crate::stages::{PollConfig, Providers, StageSettings, Stages};

/// Default cap on text sent to the speech-synthesis service, in characters.
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 5000;

/// Stage configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub openai_api_key: Option<String>,
    pub openai_api_base: String,
    pub openai_model: String,
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_api_base: String,
    pub elevenlabs_model: String,
    pub pika_api_key: Option<String>,
    pub pika_api_base: String,
    pub animation_poll_interval: Duration,
    pub animation_timeout: Duration,
    pub youtube_access_token: Option<String>,
    pub youtube_upload_base: String,
    pub ffmpeg_bin: PathBuf,
    pub ffprobe_bin: PathBuf,
    /// Limit on one request to the script, speech or animation service.
    pub http_timeout: Duration,
    /// Limit on one request of the video upload.
    pub upload_timeout: Duration,
    /// Limit on one encoder run.
    pub encode_timeout: Duration,
    pub output_dir: PathBuf,
    pub max_text_length: usize,
}

impl PipelineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                                        |
    /// |--------------------------------|------------------------------------------------|
    /// | `OPENAI_API_KEY`               | unset                                          |
    /// | `OPENAI_API_BASE`              | `https://api.openai.com/v1`                    |
    /// | `OPENAI_MODEL`                 | `gpt-4o-mini`                                  |
    /// | `ELEVENLABS_API_KEY`           | unset                                          |
    /// | `ELEVENLABS_API_BASE`          | `https://api.elevenlabs.io/v1`                 |
    /// | `ELEVENLABS_MODEL`             | `eleven_multilingual_v2`                       |
    /// | `PIKA_API_KEY`                 | unset                                          |
    /// | `PIKA_API_BASE`                | `https://api.pika.art/v1`                      |
    /// | `ANIMATION_POLL_INTERVAL_SECS` | `5`                                            |
    /// | `ANIMATION_TIMEOUT_SECS`       | `300`                                          |
    /// | `YOUTUBE_ACCESS_TOKEN`         | unset                                          |
    /// | `YOUTUBE_UPLOAD_BASE`          | `https://www.googleapis.com/upload/youtube/v3` |
    /// | `FFMPEG_BIN`                   | `ffmpeg`                                       |
    /// | `FFPROBE_BIN`                  | `ffprobe`                                      |
    /// | `HTTP_TIMEOUT_SECS`            | `120`                                          |
    /// | `UPLOAD_TIMEOUT_SECS`          | `1800`                                         |
    /// | `ENCODE_TIMEOUT_SECS`          | `900`                                          |
    /// | `OUTPUT_DIR`                   | `output`                                       |
    /// | `MAX_TEXT_LENGTH`              | `5000`                                         |
    pub fn from_env() -> Self {
        let animation_poll_interval_secs: u64 = env_or("ANIMATION_POLL_INTERVAL_SECS", "5")
            .parse()
            .expect("ANIMATION_POLL_INTERVAL_SECS must be a valid u64");

        let animation_timeout_secs: u64 = env_or("ANIMATION_TIMEOUT_SECS", "300")
            .parse()
            .expect("ANIMATION_TIMEOUT_SECS must be a valid u64");

        let http_timeout = secs_or("HTTP_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT);
        let upload_timeout = secs_or("UPLOAD_TIMEOUT_SECS", youtube::DEFAULT_UPLOAD_TIMEOUT);
        let encode_timeout = secs_or("ENCODE_TIMEOUT_SECS", ffmpeg::DEFAULT_ENCODE_TIMEOUT);

        let max_text_length: usize = env_or("MAX_TEXT_LENGTH", "5000")
            .parse()
            .expect("MAX_TEXT_LENGTH must be a valid usize");

        Self {
            openai_api_key: env_opt("OPENAI_API_KEY"),
            openai_api_base: env_or("OPENAI_API_BASE", openai::DEFAULT_API_BASE),
            openai_model: env_or("OPENAI_MODEL", openai::DEFAULT_MODEL),
            elevenlabs_api_key: env_opt("ELEVENLABS_API_KEY"),
            elevenlabs_api_base: env_or("ELEVENLABS_API_BASE", elevenlabs::DEFAULT_API_BASE),
            elevenlabs_model: env_or("ELEVENLABS_MODEL", elevenlabs::DEFAULT_MODEL),
            pika_api_key: env_opt("PIKA_API_KEY"),
            pika_api_base: env_or("PIKA_API_BASE", pika::DEFAULT_API_BASE),
            animation_poll_interval: Duration::from_secs(animation_poll_interval_secs.max(1)),
            animation_timeout: Duration::from_secs(animation_timeout_secs),
            youtube_access_token: env_opt("YOUTUBE_ACCESS_TOKEN"),
            youtube_upload_base: env_or("YOUTUBE_UPLOAD_BASE", youtube::DEFAULT_UPLOAD_BASE),
            ffmpeg_bin: env_or("FFMPEG_BIN", "ffmpeg").into(),
            ffprobe_bin: env_or("FFPROBE_BIN", "ffprobe").into(),
            http_timeout,
            upload_timeout,
            encode_timeout,
            output_dir: env_or("OUTPUT_DIR", "output").into(),
            max_text_length,
        }
    }

    /// Names of credential variables that are not set.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        [
            ("OPENAI_API_KEY", &self.openai_api_key),
            ("ELEVENLABS_API_KEY", &self.elevenlabs_api_key),
            ("PIKA_API_KEY", &self.pika_api_key),
            ("YOUTUBE_ACCESS_TOKEN", &self.youtube_access_token),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }

    /// Log one warning naming every missing credential.
    pub fn warn_missing_credentials(&self) {
        let missing = self.missing_credentials();
        if !missing.is_empty() {
            tracing::warn!(
                missing = ?missing,
                "API credentials not set; the affected stages will fail when invoked",
            );
        }
    }

    pub fn store(&self) -> ArtifactStore {
        ArtifactStore::new(&self.output_dir)
    }

    /// Production clients for every external service.
    pub fn providers(&self) -> Providers {
        Providers {
            script: Arc::new(
                OpenAiScriptGenerator::new(
                    self.openai_api_base.clone(),
                    self.openai_api_key.clone(),
                    self.openai_model.clone(),
                )
                .with_timeout(self.http_timeout),
            ),
            speech: Arc::new(
                ElevenLabsSynthesizer::new(
                    self.elevenlabs_api_base.clone(),
                    self.elevenlabs_api_key.clone(),
                    self.elevenlabs_model.clone(),
                )
                .with_timeout(self.http_timeout),
            ),
            animation: Arc::new(
                PikaAnimationService::new(self.pika_api_base.clone(), self.pika_api_key.clone())
                    .with_timeout(self.http_timeout),
            ),
            encoder: Arc::new(
                FfmpegEncoder::new(&self.ffmpeg_bin, &self.ffprobe_bin)
                    .with_timeout(self.encode_timeout),
            ),
            publisher: Arc::new(
                YoutubePublisher::new(
                    self.youtube_upload_base.clone(),
                    self.youtube_access_token.clone(),
                )
                .with_timeout(self.upload_timeout),
            ),
        }
    }

    pub fn settings(&self) -> StageSettings {
        StageSettings {
            max_text_length: self.max_text_length,
            poll: PollConfig {
                interval: self.animation_poll_interval,
                timeout: self.animation_timeout,
            },
        }
    }

    /// Build every stage with production clients.
    pub fn stages(&self) -> Stages {
        Stages::new(self.providers(), self.store(), self.settings())
    }
}

/// Whole seconds from `name`; zero is treated as one second.
fn secs_or(name: &str, default: Duration) -> Duration {
    let secs: u64 = env_or(name, &default.as_secs().to_string())
        .parse()
        .unwrap_or_else(|_| panic!("{name} must be a valid u64"));
    Duration::from_secs(secs.max(1))
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Unset and blank values are both treated as missing.
fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
