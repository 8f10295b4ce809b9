//! Configuration types for the downloader system

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::downloader::core::{DownloadError, Result};

const ENV_PREFIX: &str = "HARVESTER_";

/// Configuration for a download run
///
/// Passed by value into the downloader at construction; nothing reads
/// process-wide state after that.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Directory that receives media files and the report
    pub output_dir: PathBuf,
    /// Number of items fetched concurrently per batch
    pub batch_size: usize,
    /// Pause inserted between consecutive batches
    pub batch_delay: Duration,
    /// Per-request timeout (HEAD and GET)
    pub timeout: Duration,
    /// Payloads below this many bytes are rejected as placeholders
    pub min_file_size: u64,
    pub user_agent: String,
    /// Optional Referer header, some CDNs refuse hotlinked requests without it
    pub referer: Option<String>,
    /// Issue a HEAD check before the full transfer
    pub validate_urls: bool,
    /// Report file name; a timestamped name is used when absent
    pub report_name: Option<String>,
}

impl DownloadConfig {
    pub fn builder() -> DownloadConfigBuilder {
        DownloadConfigBuilder::default()
    }

    /// Defaults overridden by `HARVESTER_*` variables, after loading `.env` if present
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `HARVESTER_*` key
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));
        let mut builder = Self::builder();

        if let Some(dir) = get("OUTPUT_DIR") {
            builder = builder.output_dir(dir);
        }
        if let Some(value) = get("BATCH_SIZE") {
            builder = builder.batch_size(parse_var("BATCH_SIZE", &value)?);
        }
        if let Some(value) = get("BATCH_DELAY_MS") {
            builder = builder.batch_delay(Duration::from_millis(parse_var("BATCH_DELAY_MS", &value)?));
        }
        if let Some(value) = get("TIMEOUT_SECS") {
            builder = builder.timeout(Duration::from_secs(parse_var("TIMEOUT_SECS", &value)?));
        }
        if let Some(value) = get("MIN_FILE_SIZE") {
            builder = builder.min_file_size(parse_var("MIN_FILE_SIZE", &value)?);
        }
        if let Some(value) = get("USER_AGENT") {
            builder = builder.user_agent(value);
        }
        if let Some(value) = get("REFERER") {
            builder = builder.referer(value);
        }
        if let Some(value) = get("VALIDATE_URLS") {
            builder = builder.validate_urls(parse_var("VALIDATE_URLS", &value)?);
        }

        builder.build()
    }

    /// Check the invariants the batch runner and HTTP client rely on
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(DownloadError::configuration("batch size must be at least 1", "batch_size"));
        }
        if self.timeout.is_zero() {
            return Err(DownloadError::configuration("timeout must be greater than zero", "timeout"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(DownloadError::configuration("user agent must not be empty", "user_agent"));
        }
        if let Some(ref name) = self.report_name {
            if name.is_empty() || name.contains(['/', '\\']) {
                return Err(DownloadError::configuration(
                    format!("report name '{}' must be a plain file name", name),
                    "report_name",
                ));
            }
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| {
        DownloadError::configuration(
            format!("{}{}='{}' is invalid: {}", ENV_PREFIX, name, value, e),
            &name.to_ascii_lowercase(),
        )
    })
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("downloads"),
            batch_size: 5,
            batch_delay: Duration::from_millis(2000),
            timeout: Duration::from_secs(30),
            min_file_size: 10_000,
            user_agent: concat!("harvester/", env!("CARGO_PKG_VERSION")).to_string(),
            referer: None,
            validate_urls: true,
            report_name: None,
        }
    }
}

/// Builder for [`DownloadConfig`]; `build` validates the result
#[derive(Debug, Clone, Default)]
pub struct DownloadConfigBuilder {
    config: DownloadConfig,
}

impl DownloadConfigBuilder {
    pub fn output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    pub fn batch_delay(mut self, delay: Duration) -> Self {
        self.config.batch_delay = delay;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn min_file_size(mut self, bytes: u64) -> Self {
        self.config.min_file_size = bytes;
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn referer<S: Into<String>>(mut self, referer: S) -> Self {
        self.config.referer = Some(referer.into());
        self
    }

    pub fn validate_urls(mut self, enabled: bool) -> Self {
        self.config.validate_urls = enabled;
        self
    }

    pub fn report_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.report_name = Some(name.into());
        self
    }

    pub fn build(self) -> Result<DownloadConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
