//! Animation job client: create a render job, read its status, fetch the
//! finished asset.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use autoreel_core::providers::{
    AnimationJobStatus, AnimationRequest, AnimationService, ProviderError,
};

use crate::http::{
    build_client, parse_response, read_bytes, request_error, require_key,
    DEFAULT_REQUEST_TIMEOUT,
};

pub const DEFAULT_API_BASE: &str = "https://api.pika.art/v1";

#[derive(Debug, Serialize)]
struct CreateBody<'a> {
    prompt: &'a str,
    aspect_ratio: &'a str,
    fps: u32,
    duration: u32,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    id: Option<String>,
}

/// Body of `GET /video.get`.
#[derive(Debug, Deserialize)]
pub struct JobStatusResponse {
    #[serde(default)]
    pub status: String,
    pub video: Option<String>,
    pub error: Option<String>,
}

impl JobStatusResponse {
    /// Interpret the raw status. `completed` without a URL is a failure.
    pub fn into_status(self) -> AnimationJobStatus {
        match self.status.as_str() {
            "completed" => match self.video.filter(|v| !v.is_empty()) {
                Some(asset_url) => AnimationJobStatus::Completed { asset_url },
                None => AnimationJobStatus::Failed {
                    reason: "job completed but no video URL was provided".into(),
                },
            },
            "failed" => AnimationJobStatus::Failed {
                reason: self
                    .error
                    .unwrap_or_else(|| "video generation failed".to_string()),
            },
            _ => AnimationJobStatus::Pending,
        }
    }
}

pub struct PikaAnimationService {
    client: reqwest::Client,
    timeout: Duration,
    api_base: String,
    api_key: Option<String>,
}

impl PikaAnimationService {
    pub fn new(api_base: String, api_key: Option<String>) -> Self {
        Self {
            client: build_client(DEFAULT_REQUEST_TIMEOUT),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Give up on any single request after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self.timeout = timeout;
        self
    }

    fn key(&self) -> Result<&str, ProviderError> {
        require_key(self.api_key.as_deref(), "PIKA_API_KEY")
    }
}

#[async_trait]
impl AnimationService for PikaAnimationService {
    async fn submit(&self, request: &AnimationRequest) -> Result<String, ProviderError> {
        let key = self.key()?;
        let body = CreateBody {
            prompt: &request.prompt,
            aspect_ratio: &request.aspect_ratio,
            fps: request.fps,
            duration: request.duration_secs,
        };

        let response = self
            .client
            .post(format!("{}/video.create", self.api_base))
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(request_error(self.timeout))?;

        let created: CreateResponse = parse_response(response).await?;
        created
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ProviderError::InvalidResponse("create response has no job id".into()))
    }

    async fn status(&self, job_id: &str) -> Result<AnimationJobStatus, ProviderError> {
        let key = self.key()?;
        let response = self
            .client
            .get(format!("{}/video.get", self.api_base))
            .query(&[("id", job_id)])
            .bearer_auth(key)
            .send()
            .await
            .map_err(request_error(self.timeout))?;

        let status: JobStatusResponse = parse_response(response).await?;
        Ok(status.into_status())
    }

    async fn download(&self, asset_url: &str) -> Result<Vec<u8>, ProviderError> {
        let response = self
            .client
            .get(asset_url)
            .send()
            .await
            .map_err(request_error(self.timeout))?;
        read_bytes(response, self.timeout).await
    }
}
