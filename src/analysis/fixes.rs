//! Fix-code suggestions for a single issue

use crate::analysis::json::safe_parse;
use crate::analysis::prompts::fix_prompt;
use crate::analysis::{AnalysisError, FailureClassifier, FailureKind};
use crate::llm::{GenerationOptions, ModelClient};
use crate::snapshot::PageSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Code generation runs warmer and longer than page analysis
pub const FIX_GENERATION: GenerationOptions = GenerationOptions {
    temperature: 0.4,
    max_output_tokens: 4000,
};

/// The issue a fix is requested for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixIssue {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub why: String,
    #[serde(default)]
    pub fix: String,
}

/// What is known about the page the issue was found on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixContext {
    pub page_title: String,
    pub has_buttons: bool,
    pub has_images: bool,
    pub images_missing_alt: usize,
}

impl Default for FixContext {
    fn default() -> Self {
        Self {
            page_title: "Unknown".to_string(),
            has_buttons: false,
            has_images: false,
            images_missing_alt: 0,
        }
    }
}

impl FixContext {
    pub fn from_snapshot(snapshot: &PageSnapshot) -> Self {
        Self {
            page_title: snapshot.title.clone(),
            has_buttons: !snapshot.buttons.is_empty(),
            has_images: !snapshot.images.is_empty(),
            images_missing_alt: snapshot.images_missing_alt(),
        }
    }
}

/// Body of a fix request
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FixRequest {
    pub issue: Option<FixIssue>,
    /// Used when no explicit `context` is given: the page is rendered to build one
    pub url: Option<String>,
    pub context: Option<FixContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixImplementation {
    pub steps: Vec<String>,
    pub file_changes: Vec<String>,
    pub testing: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixExplanation {
    pub before: String,
    pub after: String,
    pub seo_impact: String,
    pub user_impact: String,
}

/// Generated code and instructions for one issue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixSuggestion {
    pub html_code: String,
    pub css_code: String,
    pub javascript_code: Option<String>,
    pub schema_markup: Option<String>,
    pub implementation: FixImplementation,
    pub explanation: FixExplanation,
}

/// Suggestion returned whenever generation fails or its output is unusable
pub fn placeholder_fix(issue: &FixIssue) -> FixSuggestion {
    FixSuggestion {
        html_code: "<!-- Unable to generate code -->".to_string(),
        css_code: "/* Unable to generate CSS */".to_string(),
        javascript_code: None,
        schema_markup: None,
        implementation: FixImplementation {
            steps: vec!["Manual review required".to_string()],
            file_changes: Vec::new(),
            testing: vec!["Test the fix manually".to_string()],
        },
        explanation: FixExplanation {
            before: issue.title.clone(),
            after: issue.fix.clone(),
            seo_impact: String::new(),
            user_impact: "Improved user experience".to_string(),
        },
    }
}

pub struct FixGenerator<'a> {
    model: &'a dyn ModelClient,
    classifier: &'a dyn FailureClassifier,
}

impl<'a> FixGenerator<'a> {
    pub fn new(model: &'a dyn ModelClient, classifier: &'a dyn FailureClassifier) -> Self {
        Self { model, classifier }
    }

    /// Generates a fix; only quota exhaustion is an error
    pub async fn generate(
        &self,
        issue: &FixIssue,
        context: &FixContext,
    ) -> Result<FixSuggestion, AnalysisError> {
        let raw = match self
            .model
            .generate(&fix_prompt(issue, context), &FIX_GENERATION)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                let message = e.to_string();
                if self.classifier.classify(&message) == FailureKind::QuotaExceeded {
                    return Err(AnalysisError::QuotaExceeded(message));
                }
                tracing::warn!("Fix generation failed for '{}': {}", issue.title, message);
                return Ok(placeholder_fix(issue));
            }
        };

        let parsed = safe_parse(&raw, Value::Null);
        let suggestion = match serde_json::from_value::<FixSuggestion>(parsed) {
            Ok(suggestion)
                if !suggestion.html_code.is_empty() || !suggestion.css_code.is_empty() =>
            {
                suggestion
            }
            _ => {
                tracing::info!("Fix output for '{}' was unusable", issue.title);
                placeholder_fix(issue)
            }
        };

        Ok(suggestion)
    }
}
