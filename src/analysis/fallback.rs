//! Rule-based page scoring
//!
//! Pure and deterministic: the same snapshot always yields the same
//! analysis. This is what a scan degrades to when the model is unavailable
//! or its output is unusable.

use crate::analysis::{quick_wins, Category, Impact, Issue, PageAnalysis};
use crate::snapshot::PageSnapshot;

const TITLE_PENALTY: u8 = 20;
const DESCRIPTION_PENALTY: u8 = 15;
const NO_H1_PENALTY: u8 = 15;
const MULTIPLE_H1_PENALTY: u8 = 10;
const MISSING_ALT_PENALTY: u8 = 10;
const VIEWPORT_PENALTY: u8 = 15;

pub const FALLBACK_NOTE: &str = "Rule-based analysis (AI analysis unavailable)";

fn issue(title: &str, why: &str, fix: &str, impact: Impact, category: Category) -> Issue {
    Issue {
        title: title.to_string(),
        why: why.to_string(),
        fix: fix.to_string(),
        impact,
        category,
    }
}

/// Scores a page from its snapshot alone
///
/// Starts at 100 and subtracts a fixed penalty per deficiency, never going
/// below 0. High-impact issues land in `critical_issues`, the rest in
/// `recommendations`. The result always carries a `_note`.
pub fn fallback_score(snapshot: &PageSnapshot) -> PageAnalysis {
    let mut score: u8 = 100;
    let mut issues = Vec::new();
    let mut strengths = Vec::new();

    if snapshot.has_placeholder_title() {
        score = score.saturating_sub(TITLE_PENALTY);
        issues.push(issue(
            "Missing page title",
            "The title is the headline shown in search results and browser tabs",
            "Add a descriptive <title> of 50-60 characters that names the page's topic",
            Impact::High,
            Category::OnPageSeo,
        ));
    }

    if snapshot.meta.description.trim().is_empty() {
        score = score.saturating_sub(DESCRIPTION_PENALTY);
        issues.push(issue(
            "Missing meta description",
            "Search engines show the description as the result snippet; without it they guess",
            "Add <meta name=\"description\"> with a 150-160 character summary",
            Impact::High,
            Category::OnPageSeo,
        ));
    } else {
        strengths.push("Meta description present".to_string());
    }

    match snapshot.meta.h1_count {
        0 => {
            score = score.saturating_sub(NO_H1_PENALTY);
            issues.push(issue(
                "Missing H1 heading",
                "The H1 tells users and crawlers what the page is about",
                "Add exactly one <h1> describing the page's main topic",
                Impact::High,
                Category::ContentStructure,
            ));
        }
        1 => strengths.push("Single H1 heading".to_string()),
        count => {
            score = score.saturating_sub(MULTIPLE_H1_PENALTY);
            issues.push(issue(
                &format!("Multiple H1 headings ({})", count),
                "Several H1s dilute the page's primary topic",
                "Keep one <h1> and demote the others to <h2>",
                Impact::Medium,
                Category::ContentStructure,
            ));
        }
    }

    let missing_alt = snapshot.images_missing_alt();
    if missing_alt > 0 {
        score = score.saturating_sub(MISSING_ALT_PENALTY);
        issues.push(issue(
            &format!("{} image(s) missing alt text", missing_alt),
            "Screen readers and image search rely on alt text",
            "Add a short alt attribute describing each image; use alt=\"\" for decorative ones",
            Impact::Medium,
            Category::Accessibility,
        ));
    }

    if snapshot.meta.viewport.trim().is_empty() {
        score = score.saturating_sub(VIEWPORT_PENALTY);
        issues.push(issue(
            "Missing viewport meta tag",
            "Without it mobile browsers render a zoomed-out desktop layout",
            "Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
            Impact::High,
            Category::MobileUx,
        ));
    }

    if snapshot.structure.has_semantic_layout() {
        strengths.push("Semantic page structure (header, main, footer)".to_string());
    }

    let quick_wins = quick_wins(&issues);
    let (critical_issues, recommendations): (Vec<Issue>, Vec<Issue>) =
        issues.into_iter().partition(|i| i.impact == Impact::High);

    PageAnalysis {
        page_score: score,
        page_name: snapshot.title.clone(),
        page_url: snapshot.url.clone(),
        critical_issues,
        recommendations,
        strengths,
        quick_wins,
        note: Some(FALLBACK_NOTE.to_string()),
    }
}
