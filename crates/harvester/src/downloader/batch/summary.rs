//! Aggregate statistics for a finished run

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::downloader::core::DownloadResult;

/// Totals computed once after every batch has completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub total_bytes: u64,
    /// Successful downloads per file extension
    pub formats: BTreeMap<String, usize>,
    pub duration_ms: u64,
    pub batches: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[DownloadResult], duration: Duration, batches: usize) -> Self {
        let mut summary = Self {
            total: results.len(),
            successful: 0,
            failed: 0,
            total_bytes: 0,
            formats: BTreeMap::new(),
            duration_ms: duration.as_millis() as u64,
            batches,
        };

        for result in results {
            match (result.file_size(), result.format()) {
                (Some(size), Some(format)) => {
                    summary.successful += 1;
                    summary.total_bytes += size;
                    *summary.formats.entry(format.extension().to_string()).or_insert(0) += 1;
                }
                _ => summary.failed += 1,
            }
        }

        summary
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.successful as f64 / self.total as f64
        }
    }

    pub fn average_size(&self) -> f64 {
        if self.successful == 0 {
            0.0
        } else {
            self.total_bytes as f64 / self.successful as f64
        }
    }
}
