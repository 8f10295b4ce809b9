//! Core types used throughout the downloader system
//!
//! This module contains the fundamental types that all other modules depend on.

pub mod error;
pub mod files;
pub mod http;
pub mod progress;

pub use error::{DownloadError, FileOperation, Result};
pub use http::{FetchedContent, HttpClient, UrlCheck};
pub use progress::{
    ConsoleProgressReporter, IntoProgressCallback, NullProgressReporter, ProgressCallback,
    ProgressEvent, ProgressReporter,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::sniff::{ImageDimensions, MediaFormat};

/// What happened to a single item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DownloadOutcome {
    Success {
        filename: String,
        file_size: u64,
        format: MediaFormat,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dimensions: Option<ImageDimensions>,
    },
    Failure {
        reason: String,
    },
}

/// One entry of the report; exactly one is produced per input URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadResult {
    pub url: String,
    /// 1-based position in the input list
    pub index: usize,
    #[serde(flatten)]
    pub outcome: DownloadOutcome,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl DownloadResult {
    pub fn success(
        url: impl Into<String>,
        index: usize,
        media: SavedMedia,
        duration: Duration,
    ) -> Self {
        Self {
            url: url.into(),
            index,
            outcome: DownloadOutcome::Success {
                filename: media.filename,
                file_size: media.file_size,
                format: media.format,
                dimensions: media.dimensions,
            },
            duration_ms: duration.as_millis() as u64,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(
        url: impl Into<String>,
        index: usize,
        reason: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            url: url.into(),
            index,
            outcome: DownloadOutcome::Failure { reason: reason.into() },
            duration_ms: duration.as_millis() as u64,
            timestamp: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, DownloadOutcome::Success { .. })
    }

    pub fn file_size(&self) -> Option<u64> {
        match self.outcome {
            DownloadOutcome::Success { file_size, .. } => Some(file_size),
            DownloadOutcome::Failure { .. } => None,
        }
    }

    pub fn format(&self) -> Option<MediaFormat> {
        match self.outcome {
            DownloadOutcome::Success { format, .. } => Some(format),
            DownloadOutcome::Failure { .. } => None,
        }
    }

    pub fn dimensions(&self) -> Option<ImageDimensions> {
        match self.outcome {
            DownloadOutcome::Success { dimensions, .. } => dimensions,
            DownloadOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            DownloadOutcome::Failure { reason } => Some(reason),
            DownloadOutcome::Success { .. } => None,
        }
    }
}

/// A file that made it to disk
#[derive(Debug, Clone, PartialEq)]
pub struct SavedMedia {
    pub filename: String,
    pub file_size: u64,
    pub format: MediaFormat,
    pub dimensions: Option<ImageDimensions>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_serializes_flat_with_tag() {
        let result = DownloadResult::success(
            "https://cdn.example.com/a.jpg",
            1,
            SavedMedia {
                filename: "001_a.jpg".to_string(),
                file_size: 12_000,
                format: MediaFormat::Jpeg,
                dimensions: Some(ImageDimensions { width: 600, height: 600 }),
            },
            Duration::from_millis(42),
        );

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["format"], ".jpg");
        assert_eq!(json["dimensions"]["width"], 600);
        assert_eq!(json["duration_ms"], 42);

        let back: DownloadResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_failure_accessors() {
        let result = DownloadResult::failure("https://cdn.example.com/b.jpg", 2, "HTTP 403", Duration::ZERO);
        assert!(!result.is_success());
        assert_eq!(result.error(), Some("HTTP 403"));
        assert_eq!(result.file_size(), None);
        assert_eq!(result.format(), None);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "failure");
        assert!(json.get("filename").is_none());
    }
}
