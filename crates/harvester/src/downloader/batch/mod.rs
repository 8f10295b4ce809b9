//! Bounded batch execution
//!
//! The input list is cut into groups of `batch_size`. Every item of a group is
//! polled concurrently and the runner waits for the whole group before it
//! sleeps `batch_delay` and moves on. Results come back in input order no
//! matter which item finished first.

pub mod summary;

pub use summary::BatchSummary;

use futures::stream::{self, StreamExt};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::downloader::core::progress::emit;
use crate::downloader::core::{DownloadResult, ProgressCallback, ProgressEvent};

/// Ordered results plus the aggregate summary
#[derive(Debug, Clone)]
pub struct BatchRun {
    pub results: Vec<DownloadResult>,
    pub summary: BatchSummary,
}

/// Run `process` over every URL, `batch_size` at a time.
///
/// `process` receives the 1-based input position and the URL and must always
/// produce a result; failures are expected to be folded into it.
pub async fn run_batches<F, Fut>(
    urls: &[String],
    batch_size: usize,
    batch_delay: Duration,
    progress_callback: Option<ProgressCallback>,
    process: F,
) -> BatchRun
where
    F: Fn(usize, String) -> Fut,
    Fut: Future<Output = DownloadResult>,
{
    let started = Instant::now();
    let batch_size = batch_size.max(1);
    let total_batches = urls.len().div_ceil(batch_size);
    let mut results = Vec::with_capacity(urls.len());

    info!("Processing {} URLs in {} batches of up to {}", urls.len(), total_batches, batch_size);

    for (batch_index, chunk) in urls.chunks(batch_size).enumerate() {
        let batch = batch_index + 1;

        if batch_index > 0 && !batch_delay.is_zero() {
            debug!("Pausing {:?} before batch {}", batch_delay, batch);
            tokio::time::sleep(batch_delay).await;
        }

        emit(
            progress_callback.as_ref(),
            ProgressEvent::BatchStarted {
                batch,
                total_batches,
                size: chunk.len(),
            },
        );

        let offset = batch_index * batch_size;
        let process = &process;
        let mut batch_results: Vec<(usize, DownloadResult)> = stream::iter(chunk.iter().enumerate())
            .map(|(position, url)| {
                let index = offset + position + 1;
                let item = process(index, url.clone());
                async move { (index, item.await) }
            })
            .buffer_unordered(chunk.len())
            .collect()
            .await;

        batch_results.sort_by_key(|(index, _)| *index);

        let successful = batch_results.iter().filter(|(_, r)| r.is_success()).count();
        let failed = batch_results.len() - successful;
        info!("Batch {}/{} complete: {} ok, {} failed", batch, total_batches, successful, failed);
        emit(
            progress_callback.as_ref(),
            ProgressEvent::BatchComplete {
                batch,
                successful,
                failed,
            },
        );

        results.extend(batch_results.into_iter().map(|(_, result)| result));
    }

    let summary = BatchSummary::from_results(&results, started.elapsed(), total_batches);
    BatchRun { results, summary }
}
