//! Transfer seam between the per-item pipeline and the network
//!
//! The downloader only talks to a [`ContentFetcher`]. `HttpClient` is the real
//! implementation; tests and embedders can substitute their own.

use async_trait::async_trait;

use crate::downloader::core::{FetchedContent, HttpClient, ProgressCallback, Result, UrlCheck};

#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Lightweight existence/type check before the full transfer
    async fn check(&self, url: &str) -> Result<UrlCheck>;

    /// Full transfer into memory
    async fn fetch(&self, url: &str, progress: Option<ProgressCallback>) -> Result<FetchedContent>;
}

#[async_trait]
impl ContentFetcher for HttpClient {
    async fn check(&self, url: &str) -> Result<UrlCheck> {
        self.check_url(url).await
    }

    async fn fetch(&self, url: &str, progress: Option<ProgressCallback>) -> Result<FetchedContent> {
        HttpClient::fetch(self, url, progress).await
    }
}
