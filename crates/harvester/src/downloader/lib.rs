//! Main entry point for the batch downloader
//!
//! The call chain flows as follows:
//!
//! User Code
//! ↓
//! Downloader (this file)
//! ↓
//! batch::run_batches (batch/mod.rs)
//! ↓
//! Downloader::download_one → ContentFetcher (fetcher.rs) → sniff / files
//! ↓
//! report::write_report

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info_span, warn, Instrument};
use url::Url;

use crate::downloader::{
    batch::{self, BatchRun},
    config::DownloadConfig,
    core::{
        files, progress::emit, DownloadError, DownloadResult, HttpClient, ProgressCallback,
        ProgressEvent, Result, SavedMedia,
    },
    fetcher::ContentFetcher,
};
use crate::report::{self, BatchReport};
use crate::sniff;

/// Batch media downloader
///
/// Owns the configuration and the transfer backend; every item is processed
/// independently and always yields exactly one [`DownloadResult`].
pub struct Downloader {
    config: DownloadConfig,
    fetcher: Arc<dyn ContentFetcher>,
}

impl Downloader {
    /// Create a downloader backed by the HTTP client
    pub fn new(config: DownloadConfig) -> Result<Self> {
        config.validate()?;
        let client = HttpClient::from_config(&config)?;
        Ok(Self {
            config,
            fetcher: Arc::new(client),
        })
    }

    /// Create a downloader with a custom transfer backend
    pub fn with_fetcher(config: DownloadConfig, fetcher: Arc<dyn ContentFetcher>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, fetcher })
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Process one URL. Never fails; errors become a failed result.
    pub async fn download_one(
        &self,
        index: usize,
        url: &str,
        progress_callback: Option<ProgressCallback>,
    ) -> DownloadResult {
        let started = Instant::now();

        async {
            match self.try_download(index, url, progress_callback.clone()).await {
                Ok(media) => {
                    debug!(
                        filename = %media.filename,
                        size = media.file_size,
                        "Saved {}",
                        media.format
                    );
                    DownloadResult::success(url, index, media, started.elapsed())
                }
                Err(e) => {
                    warn!(category = e.category(), "Download failed: {}", e);
                    emit(
                        progress_callback.as_ref(),
                        ProgressEvent::Error {
                            url: url.to_string(),
                            error: e.to_string(),
                        },
                    );
                    DownloadResult::failure(url, index, e.to_string(), started.elapsed())
                }
            }
        }
        .instrument(info_span!("download", index, url = %url))
        .await
    }

    async fn try_download(
        &self,
        index: usize,
        url: &str,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<SavedMedia> {
        let parsed = Url::parse(url).map_err(|e| DownloadError::invalid_url(url, e))?;

        if self.config.validate_urls {
            let check = self.fetcher.check(url).await?;
            if check.skipped {
                debug!("Server refused HEAD, continuing without check");
            }
        }

        let content = self.fetcher.fetch(url, progress_callback).await?;
        let size = content.bytes.len() as u64;

        if size < self.config.min_file_size {
            return Err(DownloadError::TooSmall {
                url: url.to_string(),
                size,
                minimum: self.config.min_file_size,
            });
        }

        let format = files::resolve_format(&content.bytes, content.content_type.as_deref(), &parsed)
            .ok_or_else(|| DownloadError::UnrecognizedFormat { url: url.to_string() })?;
        let dimensions = sniff::sniff_dimensions(&content.bytes);

        let filename = files::build_filename(index, &files::derive_identifier(&parsed), format);
        files::write_atomic(&self.config.output_dir, &filename, &content.bytes).await?;

        Ok(SavedMedia {
            filename,
            file_size: size,
            format,
            dimensions,
        })
    }

    /// Download every URL in batches and return the ordered results.
    ///
    /// Only output directory creation can fail here.
    pub async fn download_all(
        &self,
        urls: &[String],
        progress_callback: Option<ProgressCallback>,
    ) -> Result<BatchRun> {
        files::ensure_output_dir(&self.config.output_dir).await?;

        let per_item = progress_callback.clone();
        let run = batch::run_batches(
            urls,
            self.config.batch_size,
            self.config.batch_delay,
            progress_callback,
            |index, url| {
                let progress = per_item.clone();
                async move { self.download_one(index, &url, progress).await }
            },
        )
        .await;

        Ok(run)
    }

    /// Download everything and persist the JSON report next to the media
    pub async fn run(
        &self,
        urls: &[String],
        progress_callback: Option<ProgressCallback>,
    ) -> Result<(BatchReport, PathBuf)> {
        let run = self.download_all(urls, progress_callback).await?;
        let report = BatchReport::from(run);
        let path = report::write_report(
            &report,
            &self.config.output_dir,
            self.config.report_name.as_deref(),
        )
        .await?;
        Ok((report, path))
    }
}
