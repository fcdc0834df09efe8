//! Integration tests for scans and the HTTP API
//!
//! Scans run against an in-memory site and a scripted model, so quota and
//! failure behavior is deterministic. The last tests go through wiremock
//! for both the target site and the Gemini API.

use async_trait::async_trait;
use axum::{body::Body, http::Request, http::StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use ux_scanner::analysis::SubstringClassifier;
use ux_scanner::config::Config;
use ux_scanner::llm::{GeminiClient, GenerationOptions, ModelClient, ModelError};
use ux_scanner::renderer::{HttpRenderer, RenderError, RenderSession, Renderer};
use ux_scanner::scan::{ScanReport, ScanRequest, Scanner};
use ux_scanner::server::{create_router, AppState};
use ux_scanner::PageSnapshot;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GOOD_ANALYSIS: &str = r#"```json
{"score": 80, "issues": [{"problem": "Meta description too short", "fix": "Expand it", "impact": "Medium"}], "strengths": ["Fast"],}
```"#;

/// In-memory site: URL -> internal links
#[derive(Clone, Default)]
struct FakeSite {
    pages: HashMap<String, Vec<String>>,
    sessions_closed: Arc<Mutex<usize>>,
}

impl FakeSite {
    fn with_pages(count: usize) -> Self {
        let links: Vec<String> = (1..count)
            .map(|i| format!("https://example.com/p{}", i))
            .collect();
        let mut pages = HashMap::new();
        pages.insert("https://example.com/".to_string(), links.clone());
        for link in links {
            pages.insert(link, Vec::new());
        }
        Self {
            pages,
            sessions_closed: Arc::default(),
        }
    }
}

struct FakeSession(FakeSite);

#[async_trait]
impl Renderer for FakeSite {
    async fn open_session(&self) -> Result<Box<dyn RenderSession>, RenderError> {
        Ok(Box::new(FakeSession(self.clone())))
    }
}

#[async_trait]
impl RenderSession for FakeSession {
    async fn render(
        &mut self,
        url: &str,
        _timeout: Duration,
    ) -> Result<PageSnapshot, RenderError> {
        let links = self.0.pages.get(url).ok_or_else(|| RenderError::Navigation {
            url: url.to_string(),
            message: "not found".to_string(),
        })?;
        let mut snapshot = PageSnapshot::empty(url);
        snapshot.title = format!("Page {}", url);
        snapshot.internal_links = links.clone();
        Ok(snapshot)
    }

    async fn close(&mut self) {
        *self.0.sessions_closed.lock().unwrap() += 1;
    }
}

/// Replays scripted replies in order; `Err` text becomes a provider error body
#[derive(Default)]
struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<usize>,
}

impl ScriptedModel {
    fn new(replies: Vec<Result<&str, &str>>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn generate(
        &self,
        _prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<String, ModelError> {
        *self.calls.lock().unwrap() += 1;
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(body)) => Err(ModelError::Api { status: 500, body }),
            None => Err(ModelError::EmptyResponse),
        }
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.crawler.page_delay_ms = 0;
    config.model.analysis_delay_ms = 0;
    config
}

fn scanner(site: FakeSite, model: Arc<ScriptedModel>) -> Scanner {
    Scanner::new(test_config(), Arc::new(site), model)
}

fn multi_report(report: ScanReport) -> ux_scanner::scan::MultiPageReport {
    match report {
        ScanReport::MultiPage(report) => report,
        ScanReport::SinglePage(_) => panic!("expected multi-page report"),
    }
}

#[tokio::test]
async fn test_quota_stops_model_calls() {
    // Call 3 of 5 raises quota
    let model = Arc::new(ScriptedModel::new(vec![
        Ok(GOOD_ANALYSIS),
        Ok(GOOD_ANALYSIS),
        Err("429 RESOURCE_EXHAUSTED: quota exceeded"),
        Ok(GOOD_ANALYSIS),
        Ok(GOOD_ANALYSIS),
    ]));
    let site = FakeSite::with_pages(5);
    let scanner = scanner(site.clone(), model.clone());

    let report = scanner
        .scan(&ScanRequest::multi("https://example.com/", 5, 1))
        .await
        .unwrap();
    let report = multi_report(report);

    assert_eq!(model.calls(), 3);
    assert_eq!(report.pages.len(), 3);
    assert!(report.summary.quota_exceeded);
    assert_eq!(report.summary.total_pages, 5);
    assert_eq!(report.summary.analyzed_pages, 2);
    assert_eq!(report.summary.average_score, 80);
    assert!(report.pages[0].ai_analysis.is_some());
    assert!(report.pages[1].ai_analysis.is_some());
    assert!(report.pages[2].ai_analysis.is_none());
    assert!(report.pages[2].error.is_some());
    assert!(report.site_wide.is_none());
    assert_eq!(*site.sessions_closed.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_failures_are_recorded_and_aggregate_runs() {
    let model = Arc::new(ScriptedModel::new(vec![
        Ok(GOOD_ANALYSIS),
        Err("internal backend error"),
        Ok(r#"{"pageScore": 60}"#),
        Ok(
            r#"{"commonIssues": ["Thin meta descriptions"], "topPriority": ["Write descriptions"], "score": 70}"#,
        ),
    ]));
    let scanner = scanner(FakeSite::with_pages(3), model.clone());

    let report = multi_report(
        scanner
            .scan(&ScanRequest::multi("https://example.com/", 3, 1))
            .await
            .unwrap(),
    );

    assert_eq!(model.calls(), 4);
    assert_eq!(report.pages.len(), 3);
    assert!(!report.summary.quota_exceeded);
    assert_eq!(report.summary.analyzed_pages, 2);
    assert_eq!(report.summary.average_score, 70);
    assert!(report.pages[1]
        .error
        .as_deref()
        .unwrap()
        .contains("internal backend error"));

    let site_wide = report.site_wide.unwrap();
    assert_eq!(site_wide.score, 70);
    assert_eq!(site_wide.common_issues, vec!["Thin meta descriptions"]);
}

#[tokio::test]
async fn test_custom_classifier_decides_quota() {
    let model = Arc::new(ScriptedModel::new(vec![
        Ok(GOOD_ANALYSIS),
        Err("billing account suspended"),
        Ok(GOOD_ANALYSIS),
    ]));
    let scanner = scanner(FakeSite::with_pages(3), model.clone())
        .with_classifier(Arc::new(SubstringClassifier::new(["billing"])));

    let report = multi_report(
        scanner
            .scan(&ScanRequest::multi("https://example.com/", 3, 1))
            .await
            .unwrap(),
    );

    assert_eq!(model.calls(), 2);
    assert!(report.summary.quota_exceeded);
    assert_eq!(report.pages[1].error.as_deref(), Some("AI quota exceeded"));
}

#[tokio::test]
async fn test_analysis_delay_between_model_calls() {
    let model = Arc::new(ScriptedModel::new(vec![
        Ok(GOOD_ANALYSIS),
        Ok(GOOD_ANALYSIS),
        Ok(GOOD_ANALYSIS),
    ]));
    let mut config = test_config();
    config.model.analysis_delay_ms = 25;
    let scanner = Scanner::new(config, Arc::new(FakeSite::with_pages(3)), model.clone());

    let started = std::time::Instant::now();
    let report = multi_report(
        scanner
            .scan(&ScanRequest::multi("https://example.com/", 3, 1))
            .await
            .unwrap(),
    );

    assert_eq!(report.summary.analyzed_pages, 3);
    // Two gaps between three page analyses; the aggregate call adds one more
    assert_eq!(model.calls(), 4);
    assert!(started.elapsed() >= Duration::from_millis(3 * 25));
}

#[tokio::test]
async fn test_single_analyzed_page_has_no_aggregate() {
    let model = Arc::new(ScriptedModel::new(vec![Ok(GOOD_ANALYSIS)]));
    let scanner = scanner(FakeSite::with_pages(1), model.clone());

    let report = multi_report(
        scanner
            .scan(&ScanRequest::multi("https://example.com/", 5, 2))
            .await
            .unwrap(),
    );

    assert_eq!(model.calls(), 1);
    assert_eq!(report.summary.total_pages, 1);
    assert!(report.site_wide.is_none());
}

#[tokio::test]
async fn test_single_page_quota_degrades_to_fallback() {
    let model = Arc::new(ScriptedModel::new(vec![Err("Quota exceeded")]));
    let scanner = scanner(FakeSite::with_pages(1), model);

    let report = scanner
        .scan(&ScanRequest::single("https://example.com/"))
        .await
        .unwrap();

    let ScanReport::SinglePage(report) = report else {
        panic!("expected single-page report");
    };
    assert!(report.analysis.note.as_deref().unwrap().contains("quota"));
    assert_eq!(report.analysis.page_url, "https://example.com/");
}

#[tokio::test]
async fn test_single_page_render_failure_is_an_error() {
    let model = Arc::new(ScriptedModel::new(vec![]));
    let site = FakeSite::with_pages(1);
    let scanner = scanner(site.clone(), model.clone());

    let result = scanner
        .scan(&ScanRequest::single("https://example.com/unknown"))
        .await;

    assert!(matches!(result, Err(ux_scanner::ScanError::Render { .. })));
    assert_eq!(model.calls(), 0);
    assert_eq!(*site.sessions_closed.lock().unwrap(), 1);
}

// HTTP API

fn app(model: Arc<ScriptedModel>) -> axum::Router {
    let scanner = Arc::new(scanner(FakeSite::with_pages(2), model));
    create_router(AppState::new(scanner, false))
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app(Arc::default()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["status"].is_string());
    assert!(body["timestamp"].is_string());
    assert_eq!(body["apiKeyConfigured"], false);
}

#[tokio::test]
async fn test_scan_rejects_invalid_url() {
    let model = Arc::new(ScriptedModel::default());

    let (status, body) = send(
        app(model.clone()),
        post_json("/scan", json!({ "url": "not-a-url" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "success": false, "message": "Invalid URL" }));

    let (status, body) = send(
        app(model.clone()),
        post_json("/scan", json!({ "url": 123 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "success": false, "message": "Invalid URL" }));

    let (status, body) = send(app(model.clone()), post_json("/scan", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "URL is required");

    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_scan_single_page_response() {
    let model = Arc::new(ScriptedModel::new(vec![Ok(GOOD_ANALYSIS)]));

    let (status, body) = send(
        app(model),
        post_json("/scan", json!({ "url": "https://example.com/" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["scanType"], "single-page-ai");
    assert_eq!(body["url"], "https://example.com/");
    assert_eq!(body["analysis"]["pageScore"], 80);
    assert_eq!(
        body["analysis"]["criticalIssues"][0]["category"],
        "On-Page SEO"
    );
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_scan_multi_page_response() {
    let model = Arc::new(ScriptedModel::new(vec![
        Ok(GOOD_ANALYSIS),
        Ok(GOOD_ANALYSIS),
        Err("gateway timeout"),
    ]));

    let (status, body) = send(
        app(model),
        post_json(
            "/scan",
            json!({ "url": "https://example.com/", "options": { "multiPage": true, "maxPages": 5, "maxDepth": 1 } }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scanType"], "multi-page-ai");
    assert_eq!(body["summary"]["totalPages"], 2);
    assert_eq!(body["summary"]["analyzedPages"], 2);
    assert_eq!(body["summary"]["quotaExceeded"], false);
    assert_eq!(body["pages"][1]["pageNumber"], 2);
    assert!(body["siteWide"].is_null());
}

#[tokio::test]
async fn test_fix_quota_is_server_error() {
    let model = Arc::new(ScriptedModel::new(vec![Err("rate limit reached")]));

    let (status, body) = send(
        app(model),
        post_json(
            "/scan/fix",
            json!({ "issue": { "title": "Missing H1", "fix": "Add one" } }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("rate limit"));
}

#[tokio::test]
async fn test_fix_failure_returns_placeholder() {
    let model = Arc::new(ScriptedModel::new(vec![Err("backend unavailable")]));

    let (status, body) = send(
        app(model),
        post_json(
            "/scan/fix",
            json!({ "issue": { "title": "Missing H1", "fix": "Add one" } }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["fix"]["htmlCode"], "<!-- Unable to generate code -->");
    assert_eq!(body["fix"]["explanation"]["after"], "Add one");
}

// End to end through wiremock

#[tokio::test]
async fn test_end_to_end_with_gemini() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(
                    r#"<html lang="en"><head><title>Acme Legal</title>
                    <meta name="viewport" content="width=device-width"></head>
                    <body><h1>Acme</h1><a href="/contact">Contact</a></body></html>"#,
                )
                .insert_header("content-type", "text/html"),
        )
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/contact"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><head><title>Contact</title></head><body></body></html>")
                .insert_header("content-type", "text/html"),
        )
        .mount(&site)
        .await;

    let gemini = MockServer::start().await;
    let reply = r#"{"score": 66, "issues": ["Missing meta description"], "commonIssues": ["No descriptions"], "topPriority": ["Add descriptions"]}"#;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.+:generateContent$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [ { "content": { "parts": [ { "text": reply } ] } } ]
        })))
        .mount(&gemini)
        .await;

    let mut config = test_config();
    config.model.endpoint = gemini.uri();
    let model = GeminiClient::new(&config.model, Some("test-key".to_string())).unwrap();
    let renderer = HttpRenderer::new(config.renderer.clone());
    let scanner = Scanner::new(config, Arc::new(renderer), Arc::new(model));

    let report = multi_report(
        scanner
            .scan(&ScanRequest::multi(format!("{}/", site.uri()), 5, 1))
            .await
            .unwrap(),
    );

    assert_eq!(report.summary.total_pages, 2);
    assert_eq!(report.summary.analyzed_pages, 2);
    assert_eq!(report.summary.average_score, 66);
    assert_eq!(report.pages[0].title, "Acme Legal");
    assert_eq!(report.pages[1].title, "Contact");

    let analysis = report.pages[0].ai_analysis.as_ref().unwrap();
    assert_eq!(
        analysis.critical_issues[0].title,
        "Missing meta description"
    );

    let site_wide = report.site_wide.unwrap();
    assert_eq!(site_wide.score, 66);
    assert_eq!(site_wide.top_priority, vec!["Add descriptions"]);

    // Two page analyses plus the site-wide call
    assert_eq!(gemini.received_requests().await.unwrap().len(), 3);
}
