//! Crawler coordinator - bounded breadth-first traversal
//!
//! This module contains the crawl loop that coordinates:
//! - Acquiring and releasing the renderer session
//! - Draining the frontier in BFS order under page and depth budgets
//! - Rendering pages (one in flight at a time) with a hard timeout
//! - Enqueueing discovered internal links
//! - The fixed politeness delay between page visits

use crate::config::CrawlerConfig;
use crate::crawler::frontier::{CrawlState, FrontierEntry, Visit};
use crate::renderer::{RenderSession, Renderer};
use crate::snapshot::PageSnapshot;
use crate::ScanError;
use std::time::{Duration, Instant};

/// Budgets for one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOptions {
    pub max_pages: usize,
    pub max_depth: u32,
}

impl CrawlOptions {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            max_depth: config.max_depth,
        }
    }
}

/// Output of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// Successfully rendered pages in visitation order
    pub pages: Vec<PageSnapshot>,
    pub total_pages: usize,
    pub start_url: String,
    /// Every URL taken off the frontier, with its depth and render outcome
    pub visits: Vec<Visit>,
}

/// Bounded BFS crawler
///
/// The crawler borrows a [`Renderer`] and opens exactly one session per
/// [`Crawler::crawl`] call; the session is closed before `crawl` returns.
pub struct Crawler<'a> {
    renderer: &'a dyn Renderer,
    config: &'a CrawlerConfig,
}

impl<'a> Crawler<'a> {
    pub fn new(renderer: &'a dyn Renderer, config: &'a CrawlerConfig) -> Self {
        Self { renderer, config }
    }

    /// Crawls the site rooted at `seed_url`
    ///
    /// A failed render of a single page is logged and skipped; it never
    /// aborts the crawl. The only error is failing to open the session.
    ///
    /// # Arguments
    ///
    /// * `seed_url` - Absolute URL the traversal starts from (depth 0)
    /// * `options` - Page and depth budgets
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - At most `options.max_pages` snapshots
    /// * `Err(ScanError::Session)` - The renderer session could not be opened
    pub async fn crawl(
        &self,
        seed_url: &str,
        options: CrawlOptions,
    ) -> Result<CrawlResult, ScanError> {
        tracing::info!(
            "Crawl started at {} (max pages: {}, max depth: {})",
            seed_url,
            options.max_pages,
            options.max_depth
        );
        let start_time = Instant::now();

        let mut session = self
            .renderer
            .open_session()
            .await
            .map_err(ScanError::Session)?;

        let state = self.traverse(session.as_mut(), seed_url, options).await;
        session.close().await;

        let (pages, visits) = state.into_parts();
        tracing::info!(
            "Crawl complete: {} pages scanned ({} visited) in {:?}",
            pages.len(),
            visits.len(),
            start_time.elapsed()
        );

        Ok(CrawlResult {
            total_pages: pages.len(),
            pages,
            start_url: seed_url.to_string(),
            visits,
        })
    }

    /// Runs the BFS loop against an open session
    async fn traverse(
        &self,
        session: &mut dyn RenderSession,
        seed_url: &str,
        options: CrawlOptions,
    ) -> CrawlState {
        let mut state = CrawlState::new(seed_url);
        let render_timeout = Duration::from_millis(self.config.render_timeout_ms);
        let page_delay = Duration::from_millis(self.config.page_delay_ms);
        let mut first = true;

        while state.results_len() < options.max_pages {
            let entry = match state.next_entry(options.max_depth) {
                Some(entry) => entry,
                None => {
                    tracing::debug!("Frontier is empty");
                    break;
                }
            };

            if !first && !page_delay.is_zero() {
                tokio::time::sleep(page_delay).await;
            }
            first = false;

            // Mark before rendering so links from this very page cannot re-enqueue it
            state.mark_visited(&entry.url);

            tracing::info!(
                "[{}/{}] Scanning {} (depth {})",
                state.results_len() + 1,
                options.max_pages,
                entry.url,
                entry.depth
            );

            match session.render(&entry.url, render_timeout).await {
                Ok(snapshot) => {
                    state.record_visit(&entry, true);
                    self.handle_rendered_page(&mut state, &entry, snapshot, options);
                }
                Err(e) => {
                    state.record_visit(&entry, false);
                    tracing::warn!("Failed to scan {}: {}", entry.url, e);
                }
            }
        }

        if state.frontier_len() > 0 {
            tracing::debug!(
                "Page budget reached, dropping {} frontier entries",
                state.frontier_len()
            );
        }

        state
    }

    /// Stores a rendered page and enqueues its links one level deeper
    fn handle_rendered_page(
        &self,
        state: &mut CrawlState,
        entry: &FrontierEntry,
        snapshot: PageSnapshot,
        options: CrawlOptions,
    ) {
        tracing::debug!(
            "Title: \"{}\", {} headings, {} links",
            snapshot.title,
            snapshot.headings.len(),
            snapshot.links_count
        );

        // A redirect target is the same page; never scan it a second time
        if snapshot.url != entry.url && !state.mark_visited(&snapshot.url) {
            tracing::debug!(
                "{} redirected to already scanned {}, skipping",
                entry.url,
                snapshot.url
            );
            return;
        }

        if entry.depth < options.max_depth {
            let added = state.enqueue_links(
                &snapshot.internal_links,
                entry.depth + 1,
                self.config.link_fan_out,
            );
            if added > 0 {
                tracing::debug!("Found {} new links to crawl", added);
            }
        }

        state.push_result(snapshot);
    }
}
