//! Image hosting client.
//!
//! Scans that start from raw image bytes upload them first; the returned
//! public URL becomes the report's image reference.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

use crate::config::ImageHostConfig;
use crate::error::CropGuardError;

const USER_AGENT: &str = concat!("CropGuard/", env!("CARGO_PKG_VERSION"));

/// Somewhere an image can be uploaded to get a public URL back.
pub trait ImageHost: Send + Sync {
    /// Upload encoded image bytes, returning the hosted URL.
    fn upload(&self, data: &[u8]) -> impl Future<Output = Result<String, CropGuardError>> + Send;
}

/// ImgBB upload API client.
pub struct ImgBbClient {
    http_client: reqwest::Client,
    endpoint: String,
    album_id: Option<String>,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    data: Option<UploadData>,
    error: Option<UploadError>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct UploadError {
    message: String,
}

impl ImgBbClient {
    pub fn new(config: &ImageHostConfig, api_key: String) -> Result<Self, CropGuardError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CropGuardError::network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            album_id: config.album_id.clone(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ImageHost for ImgBbClient {
    async fn upload(&self, data: &[u8]) -> Result<String, CropGuardError> {
        if data.is_empty() {
            return Err(CropGuardError::image_host("Image is empty", None));
        }

        let encoded = STANDARD.encode(data);
        let mut params = vec![("key", self.api_key.as_str()), ("image", encoded.as_str())];
        if let Some(album) = self.album_id.as_deref() {
            params.push(("album", album));
        }

        tracing::debug!(endpoint = %self.endpoint, bytes = data.len(), "Uploading image");

        let response = self.http_client.post(&self.endpoint).form(&params).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        let url = parse_upload_response(status, &body).inspect_err(|e| {
            tracing::warn!(status = status, error = %e, "Image upload failed");
        })?;

        tracing::info!(url = %url, "Image uploaded");
        Ok(url)
    }
}

/// Interpret an upload response.
fn parse_upload_response(status: u16, body: &str) -> Result<String, CropGuardError> {
    let parsed: Option<UploadResponse> = serde_json::from_str(body).ok();

    if !(200..300).contains(&status) {
        let message = parsed
            .and_then(|r| r.error)
            .map(|e| e.message)
            .unwrap_or_else(|| format!("HTTP {status}"));
        return Err(CropGuardError::image_host(message, Some(status)));
    }

    let response = parsed.ok_or_else(|| {
        CropGuardError::image_host("Unreadable response from image host", Some(status))
    })?;

    if !response.success {
        let message =
            response.error.map(|e| e.message).unwrap_or_else(|| "Upload rejected".to_string());
        return Err(CropGuardError::image_host(message, Some(status)));
    }

    response
        .data
        .map(|d| d.url)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| CropGuardError::image_host("Response did not include a URL", Some(status)))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;

    /// Host that records uploads and returns a fixed URL, or fails when told to.
    #[derive(Default)]
    pub struct RecordingHost {
        pub uploads: Mutex<Vec<Vec<u8>>>,
        pub fail_with_status: Option<u16>,
        pub delay: Option<Duration>,
    }

    impl ImageHost for RecordingHost {
        async fn upload(&self, data: &[u8]) -> Result<String, CropGuardError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(status) = self.fail_with_status {
                return Err(CropGuardError::image_host("rejected", Some(status)));
            }
            let mut uploads = self.uploads.lock();
            uploads.push(data.to_vec());
            Ok(format!("https://i.ibb.co/test/{}.jpg", uploads.len()))
        }
    }
}
