//! Scan orchestration: single-page and multi-page runs
//!
//! A multi-page scan crawls first, then analyzes the crawled pages one at a
//! time with a fixed delay between model calls. The first quota failure
//! ends all model calls for the run; results gathered so far are kept.

use crate::analysis::{
    aggregate, fallback_score, AnalysisError, FailureClassifier, FixContext, FixGenerator,
    FixRequest, FixSuggestion, PageAnalysis, PageAnalyzer, SiteWideAggregate, SubstringClassifier,
};
use crate::config::Config;
use crate::crawler::{CrawlOptions, Crawler};
use crate::llm::{GenerationOptions, ModelClient};
use crate::renderer::Renderer;
use crate::snapshot::PageSnapshot;
use crate::url::parse_scan_url;
use crate::ScanError;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const QUOTA_NOTE: &str = "AI quota exceeded; showing rule-based analysis";
const FAILURE_NOTE: &str = "AI analysis failed; showing rule-based analysis";
const QUOTA_ERROR: &str = "AI quota exceeded";

/// Body of a scan request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanRequest {
    #[serde(default, deserialize_with = "lenient_url")]
    pub url: Option<String>,
    #[serde(default)]
    pub options: ScanOptions,
}

/// Keeps a non-string `url` as its JSON text so it fails URL validation
fn lenient_url<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(url)) => Some(url),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOptions {
    #[serde(default)]
    pub multi_page: bool,
    pub max_pages: Option<usize>,
    pub max_depth: Option<u32>,
}

impl ScanRequest {
    pub fn single(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            options: ScanOptions::default(),
        }
    }

    pub fn multi(url: impl Into<String>, max_pages: usize, max_depth: u32) -> Self {
        Self {
            url: Some(url.into()),
            options: ScanOptions {
                multi_page: true,
                max_pages: Some(max_pages),
                max_depth: Some(max_depth),
            },
        }
    }
}

/// Summary block of a multi-page report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    pub total_pages: usize,
    pub analyzed_pages: usize,
    pub average_score: u8,
    pub quota_exceeded: bool,
}

/// One crawled page in a multi-page report; exactly one of
/// `ai_analysis`/`error` is set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEntry {
    pub page_number: usize,
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<PageAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SinglePageReport {
    pub url: String,
    pub timestamp: String,
    pub analysis: PageAnalysis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiPageReport {
    pub url: String,
    pub timestamp: String,
    pub summary: ScanSummary,
    pub pages: Vec<PageEntry>,
    /// Serialized as `null` when absent
    pub site_wide: Option<SiteWideAggregate>,
}

/// Top-level scan output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ScanReport {
    SinglePage(SinglePageReport),
    MultiPage(MultiPageReport),
}

impl ScanReport {
    pub fn scan_type(&self) -> &'static str {
        match self {
            ScanReport::SinglePage(_) => "single-page-ai",
            ScanReport::MultiPage(_) => "multi-page-ai",
        }
    }

    pub fn url(&self) -> &str {
        match self {
            ScanReport::SinglePage(report) => &report.url,
            ScanReport::MultiPage(report) => &report.url,
        }
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Runs scans against injected renderer and model collaborators
pub struct Scanner {
    config: Config,
    renderer: Arc<dyn Renderer>,
    model: Arc<dyn ModelClient>,
    classifier: Arc<dyn FailureClassifier>,
}

impl Scanner {
    /// Creates a scanner classifying model failures with the configured quota patterns
    pub fn new(config: Config, renderer: Arc<dyn Renderer>, model: Arc<dyn ModelClient>) -> Self {
        let classifier = Arc::new(SubstringClassifier::new(&config.model.quota_patterns));
        Self {
            config,
            renderer,
            model,
            classifier,
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn FailureClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    fn generation_options(&self) -> GenerationOptions {
        GenerationOptions::from(&self.config.model)
    }

    /// Resolves request options against configured defaults and limits
    pub fn crawl_options(&self, options: &ScanOptions) -> CrawlOptions {
        let crawler = &self.config.crawler;
        CrawlOptions {
            max_pages: options
                .max_pages
                .unwrap_or(crawler.max_pages)
                .clamp(1, crawler.max_pages_limit.max(1)),
            max_depth: options.max_depth.unwrap_or(crawler.max_depth),
        }
    }

    /// Validates the request and runs the requested scan
    ///
    /// # Returns
    ///
    /// * `Err(ScanError::InvalidInput)` - Missing or invalid URL; no work was done
    /// * `Err(ScanError::Render)` - Single-page mode could not render the page
    /// * `Err(ScanError::Session)` - The renderer session could not be opened
    pub async fn scan(&self, request: &ScanRequest) -> Result<ScanReport, ScanError> {
        let url = parse_scan_url(request.url.as_deref())?;

        if request.options.multi_page {
            let options = self.crawl_options(&request.options);
            self.scan_site(url.as_str(), options)
                .await
                .map(ScanReport::MultiPage)
        } else {
            self.scan_page(url.as_str()).await.map(ScanReport::SinglePage)
        }
    }

    /// Renders and analyzes a single page
    ///
    /// Model failures, quota included, degrade to the rule-based analysis.
    pub async fn scan_page(&self, url: &str) -> Result<SinglePageReport, ScanError> {
        tracing::info!("Single-page scan of {}", url);
        let snapshot = self.render_one(url).await?;

        let analyzer = PageAnalyzer::new(
            self.model.as_ref(),
            self.classifier.as_ref(),
            self.generation_options(),
        );
        let analysis = match analyzer.analyze(&snapshot).await {
            Ok(analysis) => analysis,
            Err(AnalysisError::QuotaExceeded(message)) => {
                tracing::warn!("Model quota exceeded: {}", message);
                fallback_score(&snapshot).with_note(QUOTA_NOTE)
            }
            Err(AnalysisError::Failed(_)) => fallback_score(&snapshot).with_note(FAILURE_NOTE),
        };

        Ok(SinglePageReport {
            url: url.to_string(),
            timestamp: timestamp(),
            analysis,
        })
    }

    /// Crawls from `url` and analyzes every crawled page
    pub async fn scan_site(
        &self,
        url: &str,
        options: CrawlOptions,
    ) -> Result<MultiPageReport, ScanError> {
        let crawl = Crawler::new(self.renderer.as_ref(), &self.config.crawler)
            .crawl(url, options)
            .await?;

        if crawl.pages.is_empty() {
            tracing::warn!("No pages could be rendered from {}", url);
        }

        let analyzer = PageAnalyzer::new(
            self.model.as_ref(),
            self.classifier.as_ref(),
            self.generation_options(),
        );
        let delay = Duration::from_millis(self.config.model.analysis_delay_ms);

        let mut entries = Vec::with_capacity(crawl.pages.len());
        let mut analyzed: Vec<&PageSnapshot> = Vec::new();
        let mut scores: Vec<u32> = Vec::new();
        let mut quota_exceeded = false;

        for (index, snapshot) in crawl.pages.iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            tracing::info!(
                "Analyzing page {}/{}: {}",
                index + 1,
                crawl.pages.len(),
                snapshot.url
            );

            let mut entry = PageEntry {
                page_number: index + 1,
                url: snapshot.url.clone(),
                title: snapshot.title.clone(),
                ai_analysis: None,
                error: None,
            };

            match analyzer.analyze(snapshot).await {
                Ok(analysis) => {
                    scores.push(u32::from(analysis.page_score));
                    analyzed.push(snapshot);
                    entry.ai_analysis = Some(analysis);
                    entries.push(entry);
                }
                Err(AnalysisError::QuotaExceeded(message)) => {
                    tracing::warn!(
                        "Model quota exceeded after {} analyzed pages, stopping analysis: {}",
                        analyzed.len(),
                        message
                    );
                    entry.error = Some(QUOTA_ERROR.to_string());
                    entries.push(entry);
                    quota_exceeded = true;
                    break;
                }
                Err(AnalysisError::Failed(message)) => {
                    entry.error = Some(message);
                    entries.push(entry);
                }
            }
        }

        let average_score = if scores.is_empty() {
            0
        } else {
            let total: u32 = scores.iter().sum();
            (f64::from(total) / scores.len() as f64).round() as u8
        };

        let site_wide = if analyzed.len() >= 2 && !quota_exceeded {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            aggregate(self.model.as_ref(), &self.generation_options(), &analyzed).await
        } else {
            None
        };

        tracing::info!(
            "Site scan complete: {} pages, {} analyzed, average score {}",
            crawl.total_pages,
            analyzed.len(),
            average_score
        );

        Ok(MultiPageReport {
            url: url.to_string(),
            timestamp: timestamp(),
            summary: ScanSummary {
                total_pages: crawl.total_pages,
                analyzed_pages: analyzed.len(),
                average_score,
                quota_exceeded,
            },
            pages: entries,
            site_wide,
        })
    }

    /// Generates fix code for one issue
    ///
    /// # Returns
    ///
    /// * `Err(ScanError::InvalidRequest)` - No issue title was given
    /// * `Err(ScanError::QuotaExceeded)` - The model reported quota exhaustion
    pub async fn generate_fix(&self, request: &FixRequest) -> Result<FixSuggestion, ScanError> {
        let issue = request
            .issue
            .as_ref()
            .filter(|issue| !issue.title.trim().is_empty())
            .ok_or_else(|| ScanError::InvalidRequest("Issue title is required".to_string()))?;
        let context = match (&request.context, request.url.as_deref()) {
            (Some(context), _) => context.clone(),
            (None, Some(url)) => self.fix_context_for(url).await.unwrap_or_else(|e| {
                tracing::warn!("Could not build page context from {}: {}", url, e);
                FixContext::default()
            }),
            (None, None) => FixContext::default(),
        };

        let generator = FixGenerator::new(self.model.as_ref(), self.classifier.as_ref());
        Ok(generator.generate(issue, &context).await?)
    }

    /// Builds the fix context for a page by rendering it
    async fn fix_context_for(&self, url: &str) -> Result<FixContext, ScanError> {
        let url = parse_scan_url(Some(url))?;
        let snapshot = self.render_one(url.as_str()).await?;
        Ok(FixContext::from_snapshot(&snapshot))
    }

    /// Renders one page in its own session, closing it on every path
    async fn render_one(&self, url: &str) -> Result<PageSnapshot, ScanError> {
        let timeout = Duration::from_millis(self.config.crawler.render_timeout_ms);
        let mut session = self
            .renderer
            .open_session()
            .await
            .map_err(ScanError::Session)?;

        let rendered = session.render(url, timeout).await;
        session.close().await;

        rendered.map_err(|source| ScanError::Render {
            url: url.to_string(),
            source,
        })
    }
}
