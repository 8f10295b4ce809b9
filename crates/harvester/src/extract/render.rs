//! Page rendering backends

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::error::{ExtractError, Result};
use super::ExtractConfig;

/// Produces a DOM snapshot (serialized HTML) for a page URL.
///
/// A headless-browser engine plugs in by implementing this trait.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String>;
}

/// Renderer that loads the page over HTTP and waits a settle delay before
/// handing back the markup
#[derive(Debug, Clone)]
pub struct HttpPageRenderer {
    client: Client,
    timeout: Duration,
    settle_delay: Duration,
}

impl HttpPageRenderer {
    pub fn new(config: &ExtractConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ExtractError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            timeout: config.timeout,
            settle_delay: config.settle_delay,
        })
    }
}

#[async_trait]
impl PageRenderer for HttpPageRenderer {
    async fn render(&self, url: &str) -> Result<String> {
        debug!("Loading page: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ExtractError::from_reqwest(url, self.timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| ExtractError::from_reqwest(url, self.timeout, e))?;

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        debug!("Page loaded: {} ({} bytes)", url, html.len());
        Ok(html)
    }
}
