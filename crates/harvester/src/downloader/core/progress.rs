//! Progress tracking and reporting for batch downloads

use std::sync::Arc;

/// Progress callback for download operations
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Events emitted during a run
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    BatchStarted {
        batch: usize,
        total_batches: usize,
        size: usize,
    },
    BatchComplete {
        batch: usize,
        successful: usize,
        failed: usize,
    },
    DownloadStarted {
        url: String,
        total_size: Option<u64>,
    },
    DownloadProgress {
        url: String,
        downloaded: u64,
        total: Option<u64>,
        speed_bps: f64,
    },
    DownloadComplete {
        url: String,
        final_size: u64,
    },
    Error {
        url: String,
        error: String,
    },
}

/// Trait for progress reporting with more granular control
pub trait ProgressReporter: Send + Sync {
    fn on_batch_started(&self, _batch: usize, _total_batches: usize, _size: usize) {}
    fn on_batch_complete(&self, _batch: usize, _successful: usize, _failed: usize) {}
    fn on_download_started(&self, _url: &str, _total_size: Option<u64>) {}
    fn on_download_progress(&self, _url: &str, _downloaded: u64, _total: Option<u64>, _speed_bps: f64) {}
    fn on_download_complete(&self, _url: &str, _final_size: u64) {}
    fn on_error(&self, _url: &str, _error: &str) {}
}

/// Extension trait to convert ProgressReporter to ProgressCallback
pub trait IntoProgressCallback {
    fn into_callback(self) -> ProgressCallback;
}

impl<T: ProgressReporter + 'static> IntoProgressCallback for T {
    fn into_callback(self) -> ProgressCallback {
        Arc::new(move |event| match event {
            ProgressEvent::BatchStarted { batch, total_batches, size } => {
                self.on_batch_started(batch, total_batches, size);
            }
            ProgressEvent::BatchComplete { batch, successful, failed } => {
                self.on_batch_complete(batch, successful, failed);
            }
            ProgressEvent::DownloadStarted { url, total_size } => {
                self.on_download_started(&url, total_size);
            }
            ProgressEvent::DownloadProgress { url, downloaded, total, speed_bps } => {
                self.on_download_progress(&url, downloaded, total, speed_bps);
            }
            ProgressEvent::DownloadComplete { url, final_size } => {
                self.on_download_complete(&url, final_size);
            }
            ProgressEvent::Error { url, error } => {
                self.on_error(&url, &error);
            }
        })
    }
}

/// Simple console progress reporter implementation
#[derive(Debug, Default)]
pub struct ConsoleProgressReporter {
    pub verbose: bool,
}

impl ConsoleProgressReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn on_batch_started(&self, batch: usize, total_batches: usize, size: usize) {
        println!("📦 Batch {}/{} ({} items)", batch, total_batches, size);
    }

    fn on_batch_complete(&self, batch: usize, successful: usize, failed: usize) {
        println!("📊 Batch {} done: {} ok, {} failed", batch, successful, failed);
    }

    fn on_download_started(&self, url: &str, total_size: Option<u64>) {
        if self.verbose {
            match total_size {
                Some(size) => println!("📥 Starting download: {} ({} bytes)", url, size),
                None => println!("📥 Starting download: {}", url),
            }
        }
    }

    fn on_download_progress(&self, url: &str, downloaded: u64, total: Option<u64>, speed_bps: f64) {
        if self.verbose {
            let speed_kb = speed_bps / 1024.0;
            match total {
                Some(total) if total > 0 => {
                    let percent = (downloaded as f64 / total as f64) * 100.0;
                    println!("⏬ {}: {:.1}% ({}/{} bytes, {:.1} KB/s)",
                        url, percent, downloaded, total, speed_kb);
                }
                _ => {
                    println!("⏬ {}: {} bytes downloaded ({:.1} KB/s)",
                        url, downloaded, speed_kb);
                }
            }
        }
    }

    fn on_download_complete(&self, url: &str, final_size: u64) {
        if self.verbose {
            println!("✅ Download complete: {} ({} bytes)", url, final_size);
        }
    }

    fn on_error(&self, url: &str, error: &str) {
        eprintln!("❌ Error downloading {}: {}", url, error);
    }
}

/// Null progress reporter that does nothing
#[derive(Debug, Default)]
pub struct NullProgressReporter;

impl ProgressReporter for NullProgressReporter {}

/// Invoke an optional callback
#[inline]
pub(crate) fn emit(progress: Option<&ProgressCallback>, event: ProgressEvent) {
    if let Some(callback) = progress {
        callback(event);
    }
}
