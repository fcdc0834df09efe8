//! Model-backed page analysis

use crate::analysis::fallback::fallback_score;
use crate::analysis::json::try_parse;
use crate::analysis::prompts::page_prompt;
use crate::analysis::{
    quick_wins, AnalysisError, Category, FailureClassifier, FailureKind, Impact, Issue,
    PageAnalysis,
};
use crate::llm::{GenerationOptions, ModelClient};
use crate::snapshot::PageSnapshot;
use serde_json::{Map, Value};

const DEFAULT_SCORE: u8 = 50;

/// Analyzes one page per model call
///
/// Unusable model text degrades to [`fallback_score`]. Failed calls are
/// classified: quota exhaustion becomes [`AnalysisError::QuotaExceeded`],
/// everything else [`AnalysisError::Failed`]. There is no internal retry.
pub struct PageAnalyzer<'a> {
    model: &'a dyn ModelClient,
    classifier: &'a dyn FailureClassifier,
    options: GenerationOptions,
}

impl<'a> PageAnalyzer<'a> {
    pub fn new(
        model: &'a dyn ModelClient,
        classifier: &'a dyn FailureClassifier,
        options: GenerationOptions,
    ) -> Self {
        Self {
            model,
            classifier,
            options,
        }
    }

    pub async fn analyze(&self, snapshot: &PageSnapshot) -> Result<PageAnalysis, AnalysisError> {
        let prompt = page_prompt(snapshot);

        let raw = match self.model.generate(&prompt, &self.options).await {
            Ok(raw) => raw,
            Err(e) => {
                let message = e.to_string();
                return Err(match self.classifier.classify(&message) {
                    FailureKind::QuotaExceeded => AnalysisError::QuotaExceeded(message),
                    FailureKind::Other => {
                        tracing::warn!(
                            "Unclassified model failure for {}: {}",
                            snapshot.url,
                            message
                        );
                        AnalysisError::Failed(message)
                    }
                });
            }
        };

        let parsed = try_parse(&raw);
        match parsed.as_ref().and_then(Value::as_object) {
            Some(object) if object.contains_key("score") || object.contains_key("pageScore") => {
                Ok(normalize(object, snapshot))
            }
            _ => {
                tracing::info!(
                    "Model output for {} has no usable score, using rule-based analysis",
                    snapshot.url
                );
                Ok(fallback_score(snapshot))
            }
        }
    }
}

/// Maps a raw model object onto [`PageAnalysis`]
fn normalize(raw: &Map<String, Value>, snapshot: &PageSnapshot) -> PageAnalysis {
    let page_score = raw
        .get("score")
        .or_else(|| raw.get("pageScore"))
        .and_then(parse_score)
        .unwrap_or(DEFAULT_SCORE);

    let critical_issues: Vec<Issue> = ["issues", "criticalIssues"]
        .iter()
        .filter_map(|key| raw.get(*key).and_then(Value::as_array))
        .flatten()
        .filter_map(|item| normalize_issue(item, Impact::High))
        .collect();

    let recommendations: Vec<Issue> = raw
        .get("recommendations")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|item| normalize_issue(item, Impact::Medium))
        .collect();

    let strengths = raw
        .get("strengths")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();

    let page_name = string_field(raw, &["pageName"])
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| snapshot.title.clone());

    PageAnalysis {
        page_score,
        page_name,
        page_url: snapshot.url.clone(),
        quick_wins: quick_wins(&critical_issues),
        critical_issues,
        recommendations,
        strengths,
        note: None,
    }
}

/// Reads a score given as a number, `"85"` or `"85/100"`, clamped to 0..=100
pub(crate) fn parse_score(value: &Value) -> Option<u8> {
    let score = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches("/100").trim().parse().ok()?,
        _ => return None,
    };
    Some(score.round().clamp(0.0, 100.0) as u8)
}

fn string_field(raw: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| raw.get(*key).and_then(Value::as_str))
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

/// Accepts either an issue object or a bare string
fn normalize_issue(item: &Value, default_impact: Impact) -> Option<Issue> {
    match item {
        Value::String(title) if !title.trim().is_empty() => Some(Issue {
            title: title.trim().to_string(),
            why: String::new(),
            fix: String::new(),
            impact: default_impact,
            category: Category::from_text(title),
        }),
        Value::Object(raw) => {
            let title = string_field(raw, &["title", "problem", "issue"]).unwrap_or_default();
            let why = string_field(raw, &["why", "whyItMatters"]).unwrap_or_default();
            let fix = string_field(raw, &["fix", "recommendedFix", "solution"]).unwrap_or_default();
            if title.is_empty() && fix.is_empty() {
                return None;
            }

            let impact = string_field(raw, &["impact", "priority"])
                .and_then(|label| Impact::parse(&label))
                .unwrap_or(default_impact);
            let category = Category::from_text(&format!("{} {}", title, why));

            Some(Issue {
                title,
                why,
                fix,
                impact,
                category,
            })
        }
        _ => None,
    }
}
