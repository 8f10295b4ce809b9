//! Harvester Library
//!
//! Batch downloading of images and videos from (often short-lived) CDN URLs,
//! plus extraction of media `src` attributes from rendered pages.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use harvester::{ConsoleProgressReporter, DownloadConfig, Downloader, IntoProgressCallback};
//!
//! # async fn example() -> harvester::Result<()> {
//! let config = DownloadConfig::builder()
//!     .output_dir("downloads")
//!     .batch_size(5)
//!     .build()?;
//!
//! let downloader = Downloader::new(config)?;
//! let urls = vec!["https://cdn.example.com/photo.jpg".to_string()];
//!
//! let progress = ConsoleProgressReporter::new(false).into_callback();
//! let (report, path) = downloader.run(&urls, Some(progress)).await?;
//! println!(
//!     "{} of {} downloaded, report at {}",
//!     report.summary.successful,
//!     report.summary.total,
//!     path.display()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Bounded batches**: fixed-size groups fetched concurrently with a pause in between
//! - **Pre-flight checks**: HEAD probe for existence and media content type
//! - **Sanity threshold**: tiny payloads are rejected as placeholders
//! - **Header sniffing**: JPEG / PNG pixel size without decoding
//! - **Ordered report**: one JSON entry per input URL, in input order
//! - **Source extraction**: CSS-selector driven `src` collection from rendered pages

pub mod downloader;
pub mod extract;
pub mod report;
pub mod sniff;

// Re-export commonly used types for convenience
pub use downloader::{
    BatchSummary, ConsoleProgressReporter, ContentFetcher, DownloadConfig, DownloadError,
    DownloadOutcome, DownloadResult, Downloader, IntoProgressCallback, NullProgressReporter,
    ProgressCallback, ProgressEvent, Result,
};
pub use extract::{ExtractConfig, ExtractError, Extractor, PageExtraction, PageRenderer};
pub use report::BatchReport;
pub use sniff::{detect_format, sniff_dimensions, ImageDimensions, MediaFormat};
