//! Site-wide aggregation across analyzed pages

use crate::analysis::analyzer::parse_score;
use crate::analysis::json::safe_parse;
use crate::analysis::prompts::site_prompt;
use crate::llm::{GenerationOptions, ModelClient};
use crate::snapshot::PageSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cross-page summary produced by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteWideAggregate {
    pub common_issues: Vec<String>,
    pub top_priority: Vec<String>,
    pub score: u8,
}

/// Asks the model to compare `pages`
///
/// Returns `None` on any failure, including quota exhaustion and unusable
/// output. A missing aggregate is a normal outcome, not an error.
pub async fn aggregate(
    model: &dyn ModelClient,
    options: &GenerationOptions,
    pages: &[&PageSnapshot],
) -> Option<SiteWideAggregate> {
    let raw = match model.generate(&site_prompt(pages), options).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("Site-wide analysis failed: {}", e);
            return None;
        }
    };

    let parsed = safe_parse(&raw, Value::Null);
    let object = parsed.as_object()?;

    let score = object
        .get("score")
        .or_else(|| object.get("overallScore"))
        .and_then(parse_score);

    let Some(score) = score else {
        tracing::info!("Site-wide analysis returned no score, omitting it");
        return None;
    };

    Some(SiteWideAggregate {
        common_issues: string_list(object.get("commonIssues")),
        top_priority: string_list(object.get("topPriority")),
        score,
    })
}

/// Reads a list of strings, or of objects with a `title`/`issue`; a bare string becomes one entry
fn string_list(value: Option<&Value>) -> Vec<String> {
    let text = |item: &Value| -> Option<String> {
        match item {
            Value::String(s) => Some(s.clone()),
            Value::Object(o) => ["title", "issue", "problem"]
                .iter()
                .find_map(|key| o.get(*key).and_then(Value::as_str))
                .map(str::to_string),
            _ => None,
        }
    };

    match value {
        Some(Value::Array(items)) => items.iter().filter_map(text).collect(),
        Some(item) => text(item).into_iter().collect(),
        None => Vec::new(),
    }
}
