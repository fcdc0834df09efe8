//! HTTP page renderer
//!
//! This module fetches pages with `reqwest` and hands the body to the DOM
//! extractor. It handles:
//! - Building the HTTP client with the configured user agent
//! - Following redirects (the snapshot records the post-redirect URL)
//! - Per-render hard timeouts
//! - Error classification into [`RenderError`]

use crate::config::RendererConfig;
use crate::renderer::{extract_snapshot, RenderError, RenderSession, Renderer};
use crate::snapshot::PageSnapshot;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Builds an HTTP client for one render session
///
/// # Arguments
///
/// * `config` - The renderer configuration
///
/// # Example
///
/// ```no_run
/// use ux_scanner::config::RendererConfig;
/// use ux_scanner::renderer::build_http_client;
///
/// let client = build_http_client(&RendererConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &RendererConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Renderer that fetches pages over HTTP and extracts the static DOM
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    config: RendererConfig,
}

impl HttpRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn open_session(&self) -> Result<Box<dyn RenderSession>, RenderError> {
        let client =
            build_http_client(&self.config).map_err(|e| RenderError::Session(e.to_string()))?;
        tracing::debug!("Opened HTTP render session");
        Ok(Box::new(HttpSession {
            client: Some(client),
            pages_rendered: 0,
        }))
    }
}

/// A render session backed by one HTTP client (and its connection pool)
pub struct HttpSession {
    client: Option<Client>,
    pages_rendered: usize,
}

impl HttpSession {
    async fn fetch(client: &Client, url: &str) -> Result<PageSnapshot, RenderError> {
        let response = client.get(url).send().await.map_err(|e| {
            let message = if e.is_connect() {
                "Connection refused".to_string()
            } else if e.is_redirect() {
                "Too many redirects".to_string()
            } else {
                e.to_string()
            };
            RenderError::Navigation {
                url: url.to_string(),
                message,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Missing Content-Type is treated as HTML; servers frequently omit it
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        if !content_type.contains("html") {
            return Err(RenderError::NotHtml {
                url: url.to_string(),
                content_type,
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| RenderError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(extract_snapshot(&body, &final_url))
    }
}

#[async_trait]
impl RenderSession for HttpSession {
    async fn render(&mut self, url: &str, timeout: Duration) -> Result<PageSnapshot, RenderError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| RenderError::Session("session already closed".to_string()))?;

        let snapshot = tokio::time::timeout(timeout, Self::fetch(client, url))
            .await
            .map_err(|_| RenderError::Timeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })??;

        self.pages_rendered += 1;
        Ok(snapshot)
    }

    async fn close(&mut self) {
        if self.client.take().is_some() {
            tracing::debug!(
                "Closed HTTP render session after {} pages",
                self.pages_rendered
            );
        }
    }
}
