//! UX Scanner: crawl a site, analyze its pages, report SEO/UX issues
//!
//! This crate renders pages of a website in breadth-first order, analyzes each
//! page with an external language model (falling back to a deterministic rule
//! engine whenever the model is unavailable or returns unusable text), and
//! compiles a prioritized report.

pub mod analysis;
pub mod config;
pub mod crawler;
pub mod llm;
pub mod output;
pub mod renderer;
pub mod scan;
pub mod server;
pub mod snapshot;
pub mod url;

use thiserror::Error;

/// Main error type for scanner operations
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] UrlError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to render {url}: {source}")]
    Render {
        url: String,
        source: renderer::RenderError,
    },

    #[error("Renderer session error: {0}")]
    Session(renderer::RenderError),

    #[error("Model quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Analysis failed: {0}")]
    Analysis(String),
}

impl From<analysis::AnalysisError> for ScanError {
    fn from(err: analysis::AnalysisError) -> Self {
        match err {
            analysis::AnalysisError::QuotaExceeded(message) => Self::QuotaExceeded(message),
            analysis::AnalysisError::Failed(message) => Self::Analysis(message),
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("URL is required")]
    Missing,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for scanner operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use analysis::{PageAnalysis, PageAnalyzer};
pub use config::Config;
pub use crawler::{CrawlOptions, CrawlResult, Crawler};
pub use scan::{ScanReport, ScanRequest, Scanner};
pub use snapshot::PageSnapshot;
