//! Media source extraction from rendered pages
//!
//! Each page is rendered through a [`PageRenderer`], the snapshot is queried
//! with a CSS selector, and the `src` attributes of the matching elements and
//! everything beneath them are collected.

pub mod dom;
pub mod error;
pub mod render;

pub use dom::{collect_sources, parse_selector};
pub use error::{ExtractError, Result};
pub use render::{HttpPageRenderer, PageRenderer};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, info_span, warn, Instrument};
use url::Url;

use crate::report;

/// Settings for the extractor and its bundled HTTP renderer
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Wait after the page loads, giving late content a chance to appear
    pub settle_delay: Duration,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(2000),
            timeout: Duration::from_secs(30),
            user_agent: concat!("harvester/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ExtractConfig {
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(ExtractError::Configuration {
                message: "timeout must be greater than zero".to_string(),
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(ExtractError::Configuration {
                message: "user agent must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Sources found on one page, or the reason the page could not be read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageExtraction {
    pub url: String,
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageExtraction {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

pub struct Extractor {
    config: ExtractConfig,
    renderer: Arc<dyn PageRenderer>,
}

impl Extractor {
    /// Extractor backed by [`HttpPageRenderer`]
    pub fn new(config: ExtractConfig) -> Result<Self> {
        config.validate()?;
        let renderer = HttpPageRenderer::new(&config)?;
        Ok(Self {
            config,
            renderer: Arc::new(renderer),
        })
    }

    pub fn with_renderer(config: ExtractConfig, renderer: Arc<dyn PageRenderer>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, renderer })
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Render one page and return its de-duplicated `src` values
    pub async fn extract(&self, url: &str, selector: &str) -> Result<Vec<String>> {
        parse_selector(selector)?;
        let base = Url::parse(url).map_err(|source| ExtractError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let html = self.renderer.render(url).await?;
        collect_sources(&html, selector, Some(&base))
    }

    /// Extract from every page in order.
    ///
    /// An invalid selector fails the whole call; any other per-page failure
    /// is recorded on that page's entry.
    pub async fn extract_all(&self, urls: &[String], selector: &str) -> Result<Vec<PageExtraction>> {
        parse_selector(selector)?;

        let mut pages = Vec::with_capacity(urls.len());
        for (i, url) in urls.iter().enumerate() {
            let page = async {
                match self.extract(url, selector).await {
                    Ok(sources) => {
                        info!("Found {} source(s)", sources.len());
                        PageExtraction {
                            url: url.clone(),
                            sources,
                            error: None,
                        }
                    }
                    Err(e) => {
                        warn!(category = e.category(), "Extraction failed: {}", e);
                        PageExtraction {
                            url: url.clone(),
                            sources: Vec::new(),
                            error: Some(e.to_string()),
                        }
                    }
                }
            }
            .instrument(info_span!("extract", page = i + 1, url = %url))
            .await;
            pages.push(page);
        }

        Ok(pages)
    }
}

/// All sources across pages, first occurrence wins
pub fn unique_sources(pages: &[PageExtraction]) -> Vec<String> {
    let mut seen = HashSet::new();
    pages
        .iter()
        .flat_map(|page| page.sources.iter())
        .filter(|source| seen.insert(source.as_str()))
        .cloned()
        .collect()
}

/// Persist extraction results as pretty JSON in `dir/name`
pub async fn write_extractions(
    pages: &[PageExtraction],
    dir: &Path,
    name: &str,
) -> crate::downloader::Result<PathBuf> {
    let path = report::write_json(&pages, dir, name).await?;
    info!(pages = pages.len(), "Extraction results written to {}", path.display());
    Ok(path)
}
