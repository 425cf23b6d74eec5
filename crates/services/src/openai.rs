//! Chat-completion client used for script generation.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use autoreel_core::providers::{ProviderError, ScriptGenerator, ScriptRequest};

use crate::http::{
    build_client, parse_response, request_error, require_key, DEFAULT_REQUEST_TIMEOUT,
};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const SYSTEM_MESSAGE: &str =
    "You are a professional script writer specializing in YouTube content creation.";
const MAX_TOKENS: u32 = 2000;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Build the user prompt for one script request.
pub fn build_prompt(request: &ScriptRequest) -> String {
    let (min_words, max_words) = request.length.word_range();
    format!(
        "Write a {duration} script for a YouTube video.\n\
         \n\
         Topic: {topic}\n\
         Style: {tone}\n\
         Target word count: {min_words}-{max_words} words\n\
         \n\
         Structure the script with:\n\
         1. Hook (10-15% of content) - Grab attention immediately\n\
         2. Introduction (15-20% of content) - Set context and expectations\n\
         3. Main Content (60-70% of content) - Core information/entertainment\n\
         4. Conclusion (10-15% of content) - Wrap up and call to action\n\
         \n\
         Make it engaging, well-paced, and suitable for {style} content.\n\
         Include natural speech patterns and transitions.\n\
         Avoid jargon unless necessary for the topic.\n\
         \n\
         Format the output as a clean script with clear sections.",
        duration = request.length.duration_label(),
        topic = request.topic,
        tone = request.style.tone(),
        style = request.style.name(),
    )
}

/// [`ScriptGenerator`] backed by an OpenAI-compatible chat-completions API.
pub struct OpenAiScriptGenerator {
    client: reqwest::Client,
    timeout: Duration,
    api_base: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiScriptGenerator {
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
}

#[async_trait]
impl ScriptGenerator for OpenAiScriptGenerator {
    async fn generate(&self, request: &ScriptRequest) -> Result<String, ProviderError> {
        let key = require_key(self.api_key.as_deref(), "OPENAI_API_KEY")?;
        let prompt = build_prompt(request);
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_MESSAGE,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(request_error(self.timeout))?;

        let parsed: ChatCompletionResponse = parse_response(response).await?;
        extract_content(parsed)
    }
}

fn extract_content(response: ChatCompletionResponse) -> Result<String, ProviderError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ProviderError::InvalidResponse("completion contained no text".into()))
}
