//! Markdown report generation
//!
//! This module renders a scan report as a human-readable markdown document:
//! scores, per-page issues, quick wins and the site-wide section.

use crate::analysis::{Issue, PageAnalysis};
use crate::output::OutputResult;
use crate::scan::{MultiPageReport, ScanReport, SinglePageReport};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown report to `output_path`
///
/// # Arguments
///
/// * `report` - The scan report
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the report
pub fn generate_markdown_report(report: &ScanReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a scan report as markdown
pub fn format_markdown_report(report: &ScanReport) -> String {
    match report {
        ScanReport::SinglePage(report) => format_single(report),
        ScanReport::MultiPage(report) => format_multi(report),
    }
}

fn format_single(report: &SinglePageReport) -> String {
    let mut md = String::new();

    md.push_str("# UX Scanner Report\n\n");
    md.push_str(&format!("- **URL**: {}\n", report.url));
    md.push_str(&format!("- **Scanned**: {}\n", report.timestamp));
    md.push_str("- **Mode**: single page\n\n");

    push_analysis(&mut md, &report.analysis, "##");
    md
}

fn format_multi(report: &MultiPageReport) -> String {
    let mut md = String::new();

    md.push_str("# UX Scanner Site Report\n\n");
    md.push_str(&format!("- **URL**: {}\n", report.url));
    md.push_str(&format!("- **Scanned**: {}\n", report.timestamp));
    md.push_str("- **Mode**: multi page\n\n");

    // Summary
    let summary = &report.summary;
    md.push_str("## Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Pages crawled | {} |\n", summary.total_pages));
    md.push_str(&format!("| Pages analyzed | {} |\n", summary.analyzed_pages));
    md.push_str(&format!("| Average score | {}/100 |\n", summary.average_score));
    md.push_str(&format!(
        "| Quota exceeded | {} |\n\n",
        if summary.quota_exceeded { "yes" } else { "no" }
    ));

    if summary.quota_exceeded {
        md.push_str("> AI analysis stopped early because the model quota was exhausted.\n\n");
    }

    // Site-wide
    if let Some(site) = &report.site_wide {
        md.push_str("## Site-Wide Findings\n\n");
        md.push_str(&format!("**Site score**: {}/100\n\n", site.score));
        if !site.common_issues.is_empty() {
            md.push_str("### Common Issues\n\n");
            for issue in &site.common_issues {
                md.push_str(&format!("- {}\n", issue));
            }
            md.push('\n');
        }
        if !site.top_priority.is_empty() {
            md.push_str("### Top Priorities\n\n");
            for (i, item) in site.top_priority.iter().enumerate() {
                md.push_str(&format!("{}. {}\n", i + 1, item));
            }
            md.push('\n');
        }
    }

    // Pages
    md.push_str("## Pages\n\n");
    for page in &report.pages {
        md.push_str(&format!(
            "### {}. {} ({})\n\n",
            page.page_number, page.title, page.url
        ));
        match (&page.ai_analysis, &page.error) {
            (Some(analysis), _) => push_analysis(&mut md, analysis, "####"),
            (None, Some(error)) => md.push_str(&format!("_Analysis failed: {}_\n\n", error)),
            (None, None) => md.push_str("_Not analyzed_\n\n"),
        }
    }

    md
}

fn push_analysis(md: &mut String, analysis: &PageAnalysis, heading: &str) {
    md.push_str(&format!("**Score**: {}/100\n\n", analysis.page_score));
    if let Some(note) = &analysis.note {
        md.push_str(&format!("> {}\n\n", note));
    }

    push_issues(md, heading, "Critical Issues", &analysis.critical_issues);
    push_issues(md, heading, "Recommendations", &analysis.recommendations);

    if !analysis.quick_wins.is_empty() {
        md.push_str(&format!("{} Quick Wins\n\n", heading));
        for win in &analysis.quick_wins {
            md.push_str(&format!("- {}\n", win));
        }
        md.push('\n');
    }

    if !analysis.strengths.is_empty() {
        md.push_str(&format!("{} Strengths\n\n", heading));
        for strength in &analysis.strengths {
            md.push_str(&format!("- {}\n", strength));
        }
        md.push('\n');
    }
}

fn push_issues(md: &mut String, heading: &str, label: &str, issues: &[Issue]) {
    if issues.is_empty() {
        return;
    }

    md.push_str(&format!("{} {}\n\n", heading, label));
    md.push_str("| Issue | Impact | Category | Fix |\n");
    md.push_str("|-------|--------|----------|-----|\n");
    for issue in issues {
        md.push_str(&format!(
            "| {} | {:?} | {} | {} |\n",
            escape_cell(&issue.title),
            issue.impact,
            issue.category,
            escape_cell(&issue.fix)
        ));
    }
    md.push('\n');
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
