//! Page renderer: turns a URL into a [`PageSnapshot`]
//!
//! The renderer is a scoped resource. A crawl or single-page scan opens one
//! [`RenderSession`] at its start and closes it on every exit path; all pages
//! of that run are rendered through the same session, one at a time.
//!
//! [`HttpRenderer`] fetches pages over HTTP and extracts the snapshot from the
//! static DOM. A browser-backed renderer only needs to implement the two
//! traits below.

mod extract;
mod fetcher;

pub use extract::extract_snapshot;
pub use fetcher::{build_http_client, HttpRenderer, HttpSession};

use crate::snapshot::PageSnapshot;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while rendering a single page
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Render of {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Expected HTML from {url}, got {content_type}")]
    NotHtml { url: String, content_type: String },

    #[error("Failed to open renderer session: {0}")]
    Session(String),
}

/// Factory for render sessions
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Acquires a session; the caller must [`RenderSession::close`] it
    async fn open_session(&self) -> Result<Box<dyn RenderSession>, RenderError>;
}

/// One open renderer session (browser, connection pool, ...)
#[async_trait]
pub trait RenderSession: Send {
    /// Renders `url`, failing with [`RenderError::Timeout`] after `timeout`
    async fn render(&mut self, url: &str, timeout: Duration) -> Result<PageSnapshot, RenderError>;

    /// Releases the session's resources
    async fn close(&mut self);
}
