//! Crawler module for bounded breadth-first site traversal
//!
//! This module contains the core crawling logic, including:
//! - The BFS frontier, visited set and result accumulation
//! - Page and depth budgets with a per-page link fan-out cap
//! - Renderer session scoping and the fixed inter-page delay

mod coordinator;
mod frontier;

pub use coordinator::{CrawlOptions, CrawlResult, Crawler};
pub use frontier::{CrawlState, FrontierEntry, Visit};

use crate::config::CrawlerConfig;
use crate::renderer::Renderer;
use crate::ScanError;

/// Runs a complete crawl operation
///
/// Convenience wrapper around [`Crawler::crawl`] for callers that do not
/// keep a crawler around.
///
/// # Arguments
///
/// * `renderer` - Renderer used to open the crawl's session
/// * `config` - Crawler settings (fan-out, delays, render timeout)
/// * `seed_url` - Absolute URL the traversal starts from
/// * `options` - Page and depth budgets
pub async fn crawl(
    renderer: &dyn Renderer,
    config: &CrawlerConfig,
    seed_url: &str,
    options: CrawlOptions,
) -> Result<CrawlResult, ScanError> {
    Crawler::new(renderer, config).crawl(seed_url, options).await
}
