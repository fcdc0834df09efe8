//! Crawl state: BFS frontier, visited set and accumulated results
//!
//! One [`CrawlState`] exists per traversal. It has a single owner (the
//! crawler loop), so no locking is involved.

use crate::snapshot::PageSnapshot;
use std::collections::{HashSet, VecDeque};

/// A URL waiting in the frontier together with its discovery depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: u32,
}

/// A URL taken off the frontier and processed, in visitation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub url: String,
    pub depth: u32,
    /// False when the render of this URL failed
    pub rendered: bool,
}

/// BFS state for one crawl run
#[derive(Debug)]
pub struct CrawlState {
    /// URLs already dequeued and processed; only ever grows
    visited: HashSet<String>,
    /// Every URL ever placed in the frontier
    enqueued: HashSet<String>,
    /// FIFO work queue; depths are non-decreasing front to back
    frontier: VecDeque<FrontierEntry>,
    /// Snapshots in visitation order
    results: Vec<PageSnapshot>,
    visits: Vec<Visit>,
}

impl CrawlState {
    /// Creates the state for a traversal rooted at `seed` (depth 0)
    pub fn new(seed: &str) -> Self {
        let mut enqueued = HashSet::new();
        enqueued.insert(seed.to_string());

        Self {
            visited: HashSet::new(),
            enqueued,
            frontier: VecDeque::from([FrontierEntry {
                url: seed.to_string(),
                depth: 0,
            }]),
            results: Vec::new(),
            visits: Vec::new(),
        }
    }

    /// Pops the next entry worth processing
    ///
    /// Entries that were already visited or lie beyond `max_depth` are
    /// discarded without counting against the page budget.
    pub fn next_entry(&mut self, max_depth: u32) -> Option<FrontierEntry> {
        while let Some(entry) = self.frontier.pop_front() {
            if self.visited.contains(&entry.url) {
                tracing::trace!("Skipping already visited: {}", entry.url);
                continue;
            }
            if entry.depth > max_depth {
                tracing::trace!("Skipping {} beyond max depth {}", entry.url, max_depth);
                continue;
            }
            return Some(entry);
        }
        None
    }

    /// Marks a URL visited; returns false if it already was
    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.visited.insert(url.to_string())
    }

    pub fn record_visit(&mut self, entry: &FrontierEntry, rendered: bool) {
        self.visits.push(Visit {
            url: entry.url.clone(),
            depth: entry.depth,
            rendered,
        });
    }

    pub fn push_result(&mut self, snapshot: PageSnapshot) {
        self.results.push(snapshot);
    }

    /// Enqueues up to `cap` links that are neither visited nor already
    /// enqueued, preserving discovery order. Returns how many were added.
    pub fn enqueue_links(&mut self, links: &[String], depth: u32, cap: usize) -> usize {
        let fresh: Vec<String> = links
            .iter()
            .filter(|link| !self.visited.contains(*link) && !self.enqueued.contains(*link))
            .take(cap)
            .cloned()
            .collect();

        for link in &fresh {
            self.enqueued.insert(link.clone());
            self.frontier.push_back(FrontierEntry {
                url: link.clone(),
                depth,
            });
        }

        fresh.len()
    }

    pub fn results_len(&self) -> usize {
        self.results.len()
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Consumes the state, returning the snapshots and the visit log
    pub fn into_parts(self) -> (Vec<PageSnapshot>, Vec<Visit>) {
        (self.results, self.visits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(urls: &[&str]) -> Vec<String> {
        urls.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_state_has_seed() {
        let mut state = CrawlState::new("https://example.com/");
        assert_eq!(state.frontier_len(), 1);

        let entry = state.next_entry(2).unwrap();
        assert_eq!(entry.url, "https://example.com/");
        assert_eq!(entry.depth, 0);
        assert!(state.next_entry(2).is_none());
    }

    #[test]
    fn test_enqueue_skips_visited_and_enqueued() {
        let mut state = CrawlState::new("https://example.com/");
        let seed = state.next_entry(2).unwrap();
        state.mark_visited(&seed.url);

        let added = state.enqueue_links(
            &links(&[
                "https://example.com/",
                "https://example.com/a",
                "https://example.com/b",
            ]),
            1,
            10,
        );
        assert_eq!(added, 2);

        // Already in the frontier
        let added = state.enqueue_links(&links(&["https://example.com/a"]), 2, 10);
        assert_eq!(added, 0);
        assert_eq!(state.frontier_len(), 2);
    }

    #[test]
    fn test_enqueue_respects_cap_and_order() {
        let mut state = CrawlState::new("https://example.com/");
        let candidates: Vec<String> = (0..15)
            .map(|i| format!("https://example.com/p{}", i))
            .collect();

        assert_eq!(state.enqueue_links(&candidates, 1, 10), 10);

        state.next_entry(2); // seed
        let first = state.next_entry(2).unwrap();
        assert_eq!(first.url, "https://example.com/p0");
        assert_eq!(first.depth, 1);
    }

    #[test]
    fn test_next_entry_discards_too_deep() {
        let mut state = CrawlState::new("https://example.com/");
        state.next_entry(0);
        state.enqueue_links(&links(&["https://example.com/deep"]), 1, 10);

        assert!(state.next_entry(0).is_none());
        assert_eq!(state.frontier_len(), 0);
    }

    #[test]
    fn test_mark_visited_is_idempotent() {
        let mut state = CrawlState::new("https://example.com/");
        assert!(state.mark_visited("https://example.com/"));
        assert!(!state.mark_visited("https://example.com/"));
        assert!(state.is_visited("https://example.com/"));
    }
}
