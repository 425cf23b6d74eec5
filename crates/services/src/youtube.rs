//! Video-hosting client using the two-step resumable upload protocol.
//!
//! 1. `POST {base}/videos?uploadType=resumable&part=snippet,status` with the
//!    metadata; the session URI comes back in the `Location` header.
//! 2. `PUT` the file bytes to that URI; the body is the created resource,
//!    whose `id` is the platform identifier.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use autoreel_core::providers::{ProviderError, PublishMetadata, VideoPublisher};

use crate::http::{build_client, ensure_success, parse_response, request_error, require_key};

pub const DEFAULT_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/youtube/v3";

/// Each request carries the whole file, so the limit is far above the API default.
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(1800);

/// "People & Blogs".
pub const DEFAULT_CATEGORY_ID: &str = "22";

#[derive(Debug, Deserialize)]
struct VideoResource {
    id: Option<String>,
}

/// Metadata document sent in the session-initiation request.
pub fn metadata_body(metadata: &PublishMetadata) -> serde_json::Value {
    serde_json::json!({
        "snippet": {
            "title": metadata.title,
            "description": metadata.description,
            "tags": metadata.tags,
            "categoryId": DEFAULT_CATEGORY_ID,
        },
        "status": {
            "privacyStatus": metadata.visibility.privacy_status(),
        },
    })
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        _ => "video/mp4",
    }
}

pub struct YoutubePublisher {
    client: reqwest::Client,
    timeout: Duration,
    upload_base: String,
    access_token: Option<String>,
}

impl YoutubePublisher {
    pub fn new(upload_base: String, access_token: Option<String>) -> Self {
        Self {
            client: build_client(DEFAULT_UPLOAD_TIMEOUT),
            timeout: DEFAULT_UPLOAD_TIMEOUT,
            upload_base: upload_base.trim_end_matches('/').to_string(),
            access_token,
        }
    }

    /// Give up on either upload request after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self.timeout = timeout;
        self
    }

    async fn open_session(
        &self,
        token: &str,
        metadata: &PublishMetadata,
        content_type: &str,
        content_length: usize,
    ) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(format!("{}/videos", self.upload_base))
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .bearer_auth(token)
            .header("X-Upload-Content-Type", content_type)
            .header("X-Upload-Content-Length", content_length.to_string())
            .json(&metadata_body(metadata))
            .send()
            .await
            .map_err(request_error(self.timeout))?;

        let response = ensure_success(response).await?;
        response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                ProviderError::InvalidResponse(
                    "no Location header in upload-initiation response".into(),
                )
            })
    }
}

#[async_trait]
impl VideoPublisher for YoutubePublisher {
    async fn publish(
        &self,
        video: &Path,
        metadata: &PublishMetadata,
    ) -> Result<String, ProviderError> {
        let token = require_key(self.access_token.as_deref(), "YOUTUBE_ACCESS_TOKEN")?;
        let bytes = tokio::fs::read(video)
            .await
            .map_err(|e| ProviderError::Request(format!("{}: {e}", video.display())))?;
        let content_type = content_type_for(video);

        let session_uri = self
            .open_session(token, metadata, content_type, bytes.len())
            .await?;
        tracing::debug!(size = bytes.len(), "Upload session opened");

        let response = self
            .client
            .put(session_uri)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(request_error(self.timeout))?;

        let resource: VideoResource = parse_response(response).await?;
        resource
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ProviderError::InvalidResponse("upload response has no video id".into()))
    }
}
