//! JSON run report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::downloader::batch::{BatchRun, BatchSummary};
use crate::downloader::core::{DownloadError, DownloadResult, FileOperation, Result};

/// Persisted document: summary first, then every result in input order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub summary: BatchSummary,
    pub results: Vec<DownloadResult>,
}

impl From<BatchRun> for BatchReport {
    fn from(run: BatchRun) -> Self {
        Self {
            summary: run.summary,
            results: run.results,
        }
    }
}

/// `download-report-YYYYMMDD-HHMMSS.json`
pub fn default_report_name(at: DateTime<Utc>) -> String {
    format!("download-report-{}.json", at.format("%Y%m%d-%H%M%S"))
}

/// Serialize `value` as pretty JSON into `dir/name`
pub async fn write_json<T: Serialize>(value: &T, dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    let json = serde_json::to_vec_pretty(value)?;
    fs::write(&path, json)
        .await
        .map_err(|e| DownloadError::file_system(&path, FileOperation::Write, e))?;
    Ok(path)
}

/// Write the report into `dir`, under `name` or a timestamped default
pub async fn write_report(report: &BatchReport, dir: &Path, name: Option<&str>) -> Result<PathBuf> {
    let name = name
        .map(str::to_string)
        .unwrap_or_else(|| default_report_name(Utc::now()));
    let path = write_json(report, dir, &name).await?;

    info!(
        total = report.summary.total,
        successful = report.summary.successful,
        failed = report.summary.failed,
        "Report written to {}",
        path.display()
    );
    Ok(path)
}
