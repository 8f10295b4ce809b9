//! HTTP utilities
//!
//! Thin wrapper over a configured `reqwest::Client`: a HEAD probe that checks
//! a URL is alive and points at media, and a streaming GET that buffers the
//! body in memory while reporting progress.

use futures::StreamExt;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::downloader::config::DownloadConfig;
use crate::downloader::core::progress::emit;
use crate::downloader::core::{DownloadError, ProgressCallback, ProgressEvent, Result};

const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);
// Upper bound for pre-allocating from Content-Length
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

/// How a Content-Type header relates to media
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentTypeClass {
    /// `image/*` or `video/*`
    Media,
    /// Missing or generic binary; the bytes decide
    Undetermined,
    NotMedia,
}

pub fn classify_content_type(content_type: Option<&str>) -> ContentTypeClass {
    let Some(content_type) = content_type else {
        return ContentTypeClass::Undetermined;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if essence.starts_with("image/") || essence.starts_with("video/") {
        ContentTypeClass::Media
    } else if essence.is_empty()
        || essence == "application/octet-stream"
        || essence == "binary/octet-stream"
    {
        ContentTypeClass::Undetermined
    } else {
        ContentTypeClass::NotMedia
    }
}

/// Outcome of the HEAD probe
#[derive(Debug, Clone, PartialEq)]
pub struct UrlCheck {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    /// Server refused HEAD, so nothing was verified
    pub skipped: bool,
}

/// Body and headers of a completed GET
#[derive(Debug, Clone)]
pub struct FetchedContent {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// HTTP client configured from a [`DownloadConfig`]
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn from_config(config: &DownloadConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(ref referer) = config.referer {
            let value = HeaderValue::from_str(referer).map_err(|e| {
                DownloadError::configuration(format!("invalid referer '{}': {}", referer, e), "referer")
            })?;
            headers.insert(header::REFERER, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| DownloadError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
                field: None,
            })?;

        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    fn map_err(&self, url: &str, error: reqwest::Error) -> DownloadError {
        DownloadError::from_reqwest(url, self.timeout, error)
    }

    /// HEAD the URL and make sure it exists and is not obviously something else
    pub async fn check_url(&self, url: &str) -> Result<UrlCheck> {
        debug!("Checking URL: {}", url);
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| self.map_err(url, e))?;

        let status = response.status();
        if status == StatusCode::METHOD_NOT_ALLOWED || status == StatusCode::NOT_IMPLEMENTED {
            debug!("HEAD not supported ({}), skipping check for {}", status, url);
            return Ok(UrlCheck {
                content_type: None,
                content_length: None,
                skipped: true,
            });
        }
        ensure_success(url, &response)?;

        let content_type = content_type_of(&response);
        ensure_media(url, content_type.as_deref())?;

        Ok(UrlCheck {
            content_type,
            content_length: response.content_length(),
            skipped: false,
        })
    }

    /// GET the URL into memory, emitting progress events along the way
    pub async fn fetch(&self, url: &str, progress: Option<ProgressCallback>) -> Result<FetchedContent> {
        debug!("Fetching: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_err(url, e))?;

        ensure_success(url, &response)?;
        let content_type = content_type_of(&response);
        ensure_media(url, content_type.as_deref())?;

        let total_size = response.content_length();
        emit(
            progress.as_ref(),
            ProgressEvent::DownloadStarted {
                url: url.to_string(),
                total_size,
            },
        );

        let capacity = total_size.unwrap_or(0).min(MAX_PREALLOC) as usize;
        let mut bytes = Vec::with_capacity(capacity);
        let mut stream = response.bytes_stream();
        let start_time = Instant::now();
        let mut last_progress_time = start_time;

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| self.map_err(url, e))?;
            bytes.extend_from_slice(&chunk);

            // Report progress at most every 100ms
            let now = Instant::now();
            if now.duration_since(last_progress_time) >= PROGRESS_INTERVAL {
                let elapsed = start_time.elapsed().as_secs_f64();
                let speed = if elapsed > 0.0 { bytes.len() as f64 / elapsed } else { 0.0 };
                emit(
                    progress.as_ref(),
                    ProgressEvent::DownloadProgress {
                        url: url.to_string(),
                        downloaded: bytes.len() as u64,
                        total: total_size,
                        speed_bps: speed,
                    },
                );
                last_progress_time = now;
            }
        }

        emit(
            progress.as_ref(),
            ProgressEvent::DownloadComplete {
                url: url.to_string(),
                final_size: bytes.len() as u64,
            },
        );

        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(FetchedContent { bytes, content_type })
    }
}

fn ensure_success(url: &str, response: &Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(DownloadError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

fn ensure_media(url: &str, content_type: Option<&str>) -> Result<()> {
    match classify_content_type(content_type) {
        ContentTypeClass::NotMedia => Err(DownloadError::NotMedia {
            url: url.to_string(),
            content_type: content_type.unwrap_or_default().to_string(),
        }),
        _ => Ok(()),
    }
}

fn content_type_of(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_content_type() {
        assert_eq!(classify_content_type(Some("image/jpeg")), ContentTypeClass::Media);
        assert_eq!(classify_content_type(Some("Video/MP4; codecs=avc1")), ContentTypeClass::Media);
        assert_eq!(classify_content_type(Some("application/octet-stream")), ContentTypeClass::Undetermined);
        assert_eq!(classify_content_type(None), ContentTypeClass::Undetermined);
        assert_eq!(classify_content_type(Some("text/html; charset=utf-8")), ContentTypeClass::NotMedia);
        assert_eq!(classify_content_type(Some("application/json")), ContentTypeClass::NotMedia);
    }

    #[test]
    fn test_invalid_referer_is_configuration_error() {
        let config = DownloadConfig {
            referer: Some("bad\nvalue".to_string()),
            ..DownloadConfig::default()
        };
        let err = HttpClient::from_config(&config).unwrap_err();
        assert_eq!(err.category(), "configuration");
    }
}
