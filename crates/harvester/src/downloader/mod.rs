//! Downloader module
//!
//! This module contains all the download functionality including
//! core types, configuration, the transfer seam and batch operations.

pub mod core;
pub mod config;
pub mod batch;
pub mod fetcher;
pub mod r#lib;

// Re-export main types for convenience
pub use r#lib::Downloader;
pub use self::core::{
    DownloadResult, DownloadOutcome, SavedMedia,
    FetchedContent, HttpClient, UrlCheck,
    ProgressCallback, ProgressEvent, ProgressReporter, IntoProgressCallback,
    ConsoleProgressReporter, NullProgressReporter,
    DownloadError, Result, FileOperation,
};
pub use config::{DownloadConfig, DownloadConfigBuilder};
pub use batch::{run_batches, BatchRun, BatchSummary};
pub use fetcher::ContentFetcher;
