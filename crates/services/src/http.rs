//! Response helpers shared by every client in this crate.

use std::time::Duration;

use autoreel_core::providers::ProviderError;

/// Per-request limit used when the caller does not configure one.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Build a client whose requests give up after `timeout`, connect included.
pub fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(30)))
        .build()
        .expect("Failed to build reqwest HTTP client")
}

/// Map a transport failure. Requests that hit the client's `timeout`
/// become [`ProviderError::Timeout`].
pub(crate) fn request_error(timeout: Duration) -> impl Fn(reqwest::Error) -> ProviderError {
    move |e| {
        if e.is_timeout() {
            let target = e
                .url()
                .map(|u| u.path().to_string())
                .unwrap_or_else(|| "/".to_string());
            return ProviderError::Timeout {
                what: format!("request to {target}"),
                waited_secs: timeout.as_secs(),
            };
        }
        ProviderError::Request(e.to_string())
    }
}

/// Fail fast when a client was built without its key.
pub(crate) fn require_key<'a>(key: Option<&'a str>, var: &str) -> Result<&'a str, ProviderError> {
    key.filter(|k| !k.trim().is_empty())
        .ok_or_else(|| ProviderError::Auth(format!("{var} is not set")))
}

/// Return the response unchanged on 2xx. 401/403 become
/// [`ProviderError::Auth`], anything else [`ProviderError::Api`].
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(ProviderError::Auth(format!("{}: {body}", status.as_u16())));
    }
    Err(ProviderError::Api {
        status: status.as_u16(),
        body,
    })
}

/// Parse a successful JSON response body into the expected type.
pub(crate) async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let response = ensure_success(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

/// Read a successful binary response body.
pub(crate) async fn read_bytes(
    response: reqwest::Response,
    timeout: Duration,
) -> Result<Vec<u8>, ProviderError> {
    let response = ensure_success(response).await?;
    let bytes = response.bytes().await.map_err(request_error(timeout))?;
    Ok(bytes.to_vec())
}
