//! Speech-synthesis client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use autoreel_core::providers::{ProviderError, SpeechRequest, SpeechSynthesizer, SynthesizedAudio};

use crate::http::{
    build_client, read_bytes, request_error, require_key, DEFAULT_REQUEST_TIMEOUT,
};

pub const DEFAULT_API_BASE: &str = "https://api.elevenlabs.io/v1";
pub const DEFAULT_MODEL: &str = "eleven_multilingual_v2";

#[derive(Debug, Serialize, PartialEq)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
    speed: f32,
}

#[derive(Debug, Serialize)]
struct SynthesisBody<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

pub struct ElevenLabsSynthesizer {
    client: reqwest::Client,
    timeout: Duration,
    api_base: String,
    api_key: Option<String>,
    model: String,
}

impl ElevenLabsSynthesizer {
    pub fn new(api_base: String, api_key: Option<String>, model: String) -> Self {
        Self {
            client: build_client(DEFAULT_REQUEST_TIMEOUT),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }

    /// Give up on any single request after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self.timeout = timeout;
        self
    }

    fn body<'a>(&'a self, request: &'a SpeechRequest) -> SynthesisBody<'a> {
        SynthesisBody {
            text: &request.text,
            model_id: &self.model,
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.75,
                speed: request.speed.value(),
            },
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSynthesizer {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<SynthesizedAudio, ProviderError> {
        let key = require_key(self.api_key.as_deref(), "ELEVENLABS_API_KEY")?;
        let url = format!(
            "{}/text-to-speech/{}",
            self.api_base,
            request.voice.voice_id()
        );

        let response = self
            .client
            .post(url)
            .header("xi-api-key", key)
            .header("Accept", "audio/mpeg")
            .json(&self.body(request))
            .send()
            .await
            .map_err(request_error(self.timeout))?;

        let bytes = read_bytes(response, self.timeout).await?;
        if bytes.is_empty() {
            return Err(ProviderError::InvalidResponse("empty audio body".into()));
        }
        tracing::debug!(bytes = bytes.len(), voice = request.voice.name(), "Speech synthesized");

        Ok(SynthesizedAudio {
            bytes,
            duration_secs: None,
        })
    }
}
