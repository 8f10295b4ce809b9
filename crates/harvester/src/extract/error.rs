use std::time::Duration;
use thiserror::Error;

/// Errors raised while rendering a page or querying its DOM
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Invalid CSS selector '{selector}': {reason}")]
    InvalidSelector {
        selector: String,
        reason: String,
    },

    #[error("Invalid page URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to load page '{url}': {source}")]
    HttpRequest {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Loading page '{url}' timed out after {timeout:?}")]
    NetworkTimeout {
        url: String,
        timeout: Duration,
    },

    #[error("HTTP {status} for page '{url}'")]
    HttpStatus {
        url: String,
        status: u16,
    },

    /// Renderer-specific failure reported by a custom engine
    #[error("Rendering '{url}' failed: {message}")]
    Render {
        url: String,
        message: String,
    },

    #[error("Invalid extractor configuration: {message}")]
    Configuration {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, ExtractError>;

impl ExtractError {
    pub fn from_reqwest(url: &str, timeout: Duration, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ExtractError::NetworkTimeout {
                url: url.to_string(),
                timeout,
            }
        } else if let Some(status) = error.status() {
            ExtractError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            ExtractError::HttpRequest {
                url: url.to_string(),
                source: error,
            }
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            ExtractError::InvalidSelector { .. } => "selector",
            ExtractError::InvalidUrl { .. } => "invalid_url",
            ExtractError::HttpRequest { .. } => "network",
            ExtractError::NetworkTimeout { .. } => "timeout",
            ExtractError::HttpStatus { .. } => "http_status",
            ExtractError::Render { .. } => "render",
            ExtractError::Configuration { .. } => "configuration",
        }
    }
}
