//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP sites and test the full
//! crawl cycle end-to-end through the HTTP renderer.

use std::collections::HashSet;
use ux_scanner::config::{CrawlerConfig, RendererConfig};
use ux_scanner::crawler::{crawl, CrawlOptions, Crawler};
use ux_scanner::renderer::HttpRenderer;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Crawler settings with no politeness delay
fn test_crawler_config() -> CrawlerConfig {
    CrawlerConfig {
        page_delay_ms: 0,
        render_timeout_ms: 5_000,
        ..CrawlerConfig::default()
    }
}

fn options(max_pages: usize, max_depth: u32) -> CrawlOptions {
    CrawlOptions {
        max_pages,
        max_depth,
    }
}

/// Mounts an HTML page whose body links to `links`
async fn mount_page(server: &MockServer, page: &str, title: &str, links: &[&str]) {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a href="{}">{}</a>"#, link, link))
        .collect();

    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(
                    "<html><head><title>{}</title></head><body><h1>{}</h1>{}</body></html>",
                    title, title, anchors
                ))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn paths(server: &MockServer, urls: impl IntoIterator<Item = String>) -> Vec<String> {
    let base = server.uri();
    urls.into_iter()
        .map(|url| url.trim_start_matches(&base).to_string())
        .collect()
}

#[tokio::test]
async fn test_full_crawl_breadth_first() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Home", &["/a", "/b"]).await;
    mount_page(&server, "/a", "A", &["/c", "/"]).await;
    mount_page(&server, "/b", "B", &["/c", "/a"]).await;
    mount_page(&server, "/c", "C", &["/d"]).await;
    mount_page(&server, "/d", "D", &[]).await;

    let renderer = HttpRenderer::new(RendererConfig::default());
    let config = test_crawler_config();
    let crawler = Crawler::new(&renderer, &config);

    let result = crawler
        .crawl(&format!("{}/", server.uri()), options(10, 2))
        .await
        .unwrap();

    let pages = paths(&server, result.pages.iter().map(|p| p.url.clone()));
    assert_eq!(pages, vec!["/", "/a", "/b", "/c"]);
    assert_eq!(result.total_pages, 4);

    // Depths never exceed the budget and every URL is visited once
    assert!(result.visits.iter().all(|v| v.depth <= 2));
    let unique: HashSet<&str> = result.visits.iter().map(|v| v.url.as_str()).collect();
    assert_eq!(unique.len(), result.visits.len());

    // Depth is assigned at first discovery, in non-decreasing order
    let depths: Vec<u32> = result.visits.iter().map(|v| v.depth).collect();
    assert_eq!(depths, vec![0, 1, 1, 2]);
}

#[tokio::test]
async fn test_page_budget_drops_remaining_frontier() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Home", &["/1", "/2", "/3", "/4", "/5"]).await;
    for page in ["/1", "/2", "/3", "/4", "/5"] {
        mount_page(&server, page, page, &[]).await;
    }

    let renderer = HttpRenderer::new(RendererConfig::default());
    let config = test_crawler_config();
    let crawler = Crawler::new(&renderer, &config);

    let result = crawler
        .crawl(&format!("{}/", server.uri()), options(3, 1))
        .await
        .unwrap();

    assert_eq!(result.total_pages, 3);
    let pages = paths(&server, result.pages.iter().map(|p| p.url.clone()));
    assert_eq!(pages, vec!["/", "/1", "/2"]);
    assert!(result.visits.iter().all(|v| v.depth <= 1));
}

#[tokio::test]
async fn test_broken_pages_are_skipped() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Home", &["/missing", "/ok"]).await;
    mount_page(&server, "/ok", "OK", &[]).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let renderer = HttpRenderer::new(RendererConfig::default());
    let config = test_crawler_config();
    let crawler = Crawler::new(&renderer, &config);

    let result = crawler
        .crawl(&format!("{}/", server.uri()), options(5, 1))
        .await
        .unwrap();

    let pages = paths(&server, result.pages.iter().map(|p| p.url.clone()));
    assert_eq!(pages, vec!["/", "/ok"]);
    assert_eq!(result.visits.len(), 3);
    assert!(!result.visits[1].rendered);
}

#[tokio::test]
async fn test_only_internal_links_are_followed() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        "Home",
        &[
            "https://other.example/",
            "/about#team",
            "mailto:hello@example.com",
            "tel:+15555550100",
            "/about",
        ],
    )
    .await;
    mount_page(&server, "/about", "About", &[]).await;

    let renderer = HttpRenderer::new(RendererConfig::default());
    let config = test_crawler_config();
    let crawler = Crawler::new(&renderer, &config);

    let result = crawler
        .crawl(&format!("{}/", server.uri()), options(10, 2))
        .await
        .unwrap();

    let pages = paths(&server, result.pages.iter().map(|p| p.url.clone()));
    assert_eq!(pages, vec!["/", "/about"]);
    assert_eq!(result.pages[0].links_count, 5);
}

#[tokio::test]
async fn test_redirect_target_is_scanned_once() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Home", &["/old", "/new"]).await;
    mount_page(&server, "/new", "New", &[]).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&server)
        .await;

    let renderer = HttpRenderer::new(RendererConfig::default());
    let config = test_crawler_config();
    let crawler = Crawler::new(&renderer, &config);

    let result = crawler
        .crawl(&format!("{}/", server.uri()), options(10, 1))
        .await
        .unwrap();

    let pages = paths(&server, result.pages.iter().map(|p| p.url.clone()));
    assert_eq!(pages, vec!["/", "/new"]);
}

#[tokio::test]
async fn test_unreachable_seed_yields_empty_crawl() {
    // Nothing listens on the discard port
    let renderer = HttpRenderer::new(RendererConfig::default());
    let config = test_crawler_config();

    let result = crawl(&renderer, &config, "http://127.0.0.1:9/", options(5, 2))
        .await
        .unwrap();

    assert_eq!(result.total_pages, 0);
    assert_eq!(result.visits.len(), 1);
    assert_eq!(result.start_url, "http://127.0.0.1:9/");
}
