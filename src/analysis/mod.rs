//! Page analysis: model-backed scoring with a deterministic fallback
//!
//! - [`json`]: best-effort extraction of JSON from free-form model text
//! - [`fallback`]: rule-based scorer used whenever the model cannot help
//! - [`classify`]: maps opaque model failures to quota / other
//! - [`PageAnalyzer`]: one model call per page, normalized to [`PageAnalysis`]
//! - [`aggregate`]: optional cross-page summary
//! - [`fixes`]: code suggestions for a single issue

mod aggregate;
mod analyzer;
mod classify;
mod fallback;
mod fixes;
pub mod json;
mod prompts;

pub use aggregate::{aggregate, SiteWideAggregate};
pub use analyzer::PageAnalyzer;
pub use classify::{FailureClassifier, FailureKind, SubstringClassifier};
pub use fallback::fallback_score;
pub use fixes::{
    placeholder_fix, FixContext, FixExplanation, FixGenerator, FixImplementation, FixIssue,
    FixRequest, FixSuggestion,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors surfaced by the analyzer to its caller
///
/// Unusable model text is never an error; it degrades to the fallback.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The provider reported quota or rate-limit exhaustion; stop calling it for this run
    #[error("Model quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Model call failed: {0}")]
    Failed(String),
}

/// Impact level of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl Impact {
    /// Parses a model-provided impact or priority label
    ///
    /// "Critical" counts as High; anything unrecognized yields `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" | "high" => Some(Impact::High),
            "medium" | "moderate" => Some(Impact::Medium),
            "low" | "minor" => Some(Impact::Low),
            _ => None,
        }
    }
}

/// Issue category, serialized by its display name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "On-Page SEO")]
    OnPageSeo,
    #[serde(rename = "Accessibility")]
    Accessibility,
    #[serde(rename = "Performance")]
    Performance,
    #[serde(rename = "Mobile UX")]
    MobileUx,
    #[serde(rename = "Content Structure")]
    ContentStructure,
    #[serde(rename = "General SEO")]
    GeneralSeo,
}

impl Category {
    /// Buckets free text by keyword; first matching bucket wins
    pub fn from_text(text: &str) -> Self {
        let text = text.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| text.contains(w));

        if has(&["title", "meta"]) {
            Category::OnPageSeo
        } else if has(&["alt", "access"]) {
            Category::Accessibility
        } else if has(&["speed", "load"]) {
            Category::Performance
        } else if has(&["mobile", "viewport"]) {
            Category::MobileUx
        } else if has(&["heading"]) {
            Category::ContentStructure
        } else {
            Category::GeneralSeo
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::OnPageSeo => "On-Page SEO",
            Category::Accessibility => "Accessibility",
            Category::Performance => "Performance",
            Category::MobileUx => "Mobile UX",
            Category::ContentStructure => "Content Structure",
            Category::GeneralSeo => "General SEO",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub title: String,
    pub why: String,
    pub fix: String,
    pub impact: Impact,
    pub category: Category,
}

/// Analysis of a single page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAnalysis {
    /// 0..=100
    pub page_score: u8,
    pub page_name: String,
    pub page_url: String,
    pub critical_issues: Vec<Issue>,
    pub recommendations: Vec<Issue>,
    pub strengths: Vec<String>,
    /// At most [`MAX_QUICK_WINS`] entries
    pub quick_wins: Vec<String>,
    /// Present when the result came from the rule-based fallback
    #[serde(rename = "_note", default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

pub const MAX_QUICK_WINS: usize = 3;

impl PageAnalysis {
    pub fn is_fallback(&self) -> bool {
        self.note.is_some()
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// All issues, critical first
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.critical_issues.iter().chain(self.recommendations.iter())
    }
}

/// First `MAX_QUICK_WINS` non-empty issue titles
pub(crate) fn quick_wins<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Vec<String> {
    issues
        .into_iter()
        .map(|issue| issue.title.clone())
        .filter(|title| !title.is_empty())
        .take(MAX_QUICK_WINS)
        .collect()
}
