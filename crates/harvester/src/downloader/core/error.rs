//! Error types for the downloader with per-item context

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Everything that can go wrong while fetching, checking or saving a media item.
///
/// Errors raised while processing an item are folded into a failed
/// `DownloadResult`; only configuration, output directory creation and report
/// writing surface from a run.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Network-level failure (connect, TLS, body read)
    #[error("HTTP request to '{url}' failed: {source}")]
    HttpRequest {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to '{url}' timed out after {timeout:?}")]
    NetworkTimeout {
        url: String,
        timeout: Duration,
    },

    /// Server answered with a non-success status
    #[error("HTTP {status} for '{url}'")]
    HttpStatus {
        url: String,
        status: u16,
    },

    #[error("Not an image or video: '{url}' returned content type '{content_type}'")]
    NotMedia {
        url: String,
        content_type: String,
    },

    /// Payload smaller than the configured threshold, usually a placeholder or thumbnail
    #[error("File too small: {size} bytes (minimum {minimum} bytes), likely a placeholder or thumbnail")]
    TooSmall {
        url: String,
        size: u64,
        minimum: u64,
    },

    #[error("Could not determine media format for '{url}'")]
    UnrecognizedFormat {
        url: String,
    },

    #[error("File operation {operation} failed on '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        operation: FileOperation,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid URL '{url}': {suggestion}")]
    InvalidUrl {
        url: String,
        suggestion: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid configuration: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
    },

    #[error("Failed to serialize report: {source}")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },
}

/// Types of file operations for error context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    CreateDir,
    Write,
    Rename,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::CreateDir => write!(f, "create directory"),
            FileOperation::Write => write!(f, "write"),
            FileOperation::Rename => write!(f, "rename"),
        }
    }
}

pub type Result<T> = std::result::Result<T, DownloadError>;

impl DownloadError {
    /// Map a reqwest error, keeping the configured timeout for the message
    pub fn from_reqwest(url: &str, timeout: Duration, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            DownloadError::NetworkTimeout {
                url: url.to_string(),
                timeout,
            }
        } else if let Some(status) = error.status() {
            DownloadError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            DownloadError::HttpRequest {
                url: url.to_string(),
                source: error,
            }
        }
    }

    /// Attach path and operation to an I/O error
    pub fn file_system<P: Into<PathBuf>>(path: P, operation: FileOperation, source: std::io::Error) -> Self {
        DownloadError::FileSystem {
            path: path.into(),
            operation,
            source,
        }
    }

    /// Invalid URL with a hint matching the parse failure
    pub fn invalid_url(url: &str, source: url::ParseError) -> Self {
        let suggestion = match source {
            url::ParseError::EmptyHost => "URL must have a valid hostname",
            url::ParseError::InvalidPort => "Port number must be between 1 and 65535",
            url::ParseError::RelativeUrlWithoutBase => "URL must be absolute (include http:// or https://)",
            _ => "Check URL format and try again",
        }
        .to_string();

        DownloadError::InvalidUrl {
            url: url.to_string(),
            suggestion,
            source,
        }
    }

    pub fn configuration<S: Into<String>>(message: S, field: &str) -> Self {
        DownloadError::Configuration {
            message: message.into(),
            field: Some(field.to_string()),
        }
    }

    /// Get error category for logging and the report
    pub fn category(&self) -> &'static str {
        match self {
            DownloadError::HttpRequest { .. } => "network",
            DownloadError::NetworkTimeout { .. } => "timeout",
            DownloadError::HttpStatus { .. } => "http_status",
            DownloadError::NotMedia { .. } => "content_type",
            DownloadError::TooSmall { .. } => "too_small",
            DownloadError::UnrecognizedFormat { .. } => "unrecognized_format",
            DownloadError::FileSystem { .. } => "file_system",
            DownloadError::InvalidUrl { .. } => "invalid_url",
            DownloadError::Configuration { .. } => "configuration",
            DownloadError::Serialization { .. } => "serialization",
        }
    }
}

impl From<url::ParseError> for DownloadError {
    fn from(error: url::ParseError) -> Self {
        DownloadError::invalid_url("<unparseable>", error)
    }
}

impl From<serde_json::Error> for DownloadError {
    fn from(source: serde_json::Error) -> Self {
        DownloadError::Serialization { source }
    }
}
