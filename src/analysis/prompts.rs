//! Prompt builders
//!
//! Page prompts carry derived counts only, never the full snapshot.

use crate::analysis::fixes::{FixContext, FixIssue};
use crate::snapshot::PageSnapshot;

fn present(value: &str) -> &'static str {
    if value.trim().is_empty() {
        "MISSING"
    } else {
        "present"
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

pub fn page_prompt(snapshot: &PageSnapshot) -> String {
    format!(
        r#"You are a senior SEO and UX expert. Analyze this page summary.

URL: {url}
Title: {title}
Meta description: {description}
H1 count: {h1}
Total headings: {headings}
Images: {images} (missing alt: {missing_alt})
Links: {links}
Buttons: {buttons}
Viewport tag: {viewport}
Language: {lang}
Semantic structure: header={header}, nav={nav}, main={main}, footer={footer}

Return ONLY valid JSON, no markdown:
{{
  "pageName": "short page name",
  "score": 0-100,
  "issues": [
    {{"problem": "...", "why": "...", "fix": "...", "impact": "High|Medium|Low"}}
  ],
  "recommendations": [
    {{"problem": "...", "why": "...", "fix": "...", "impact": "Medium|Low"}}
  ],
  "strengths": ["..."]
}}"#,
        url = snapshot.url,
        title = snapshot.title,
        description = present(&snapshot.meta.description),
        h1 = snapshot.meta.h1_count,
        headings = snapshot.headings.len(),
        images = snapshot.images.len(),
        missing_alt = snapshot.images_missing_alt(),
        links = snapshot.links_count,
        buttons = snapshot.buttons.len(),
        viewport = yes_no(!snapshot.meta.viewport.trim().is_empty()),
        lang = if snapshot.meta.lang.is_empty() {
            "not set"
        } else {
            snapshot.meta.lang.as_str()
        },
        header = snapshot.structure.has_header,
        nav = snapshot.structure.has_nav,
        main = snapshot.structure.has_main,
        footer = snapshot.structure.has_footer,
    )
}

pub fn site_prompt(pages: &[&PageSnapshot]) -> String {
    let mut summary = String::new();
    for (i, page) in pages.iter().enumerate() {
        summary.push_str(&format!(
            "{}. {} ({}): H1s={}, description={}, images missing alt={}, viewport={}\n",
            i + 1,
            page.title,
            page.url,
            page.meta.h1_count,
            present(&page.meta.description),
            page.images_missing_alt(),
            yes_no(!page.meta.viewport.trim().is_empty()),
        ));
    }

    format!(
        r#"You are an SEO consultant comparing the pages of one website.

Pages:
{summary}
Identify problems shared across pages and what to fix first.

Return ONLY valid JSON, no markdown:
{{
  "commonIssues": ["..."],
  "topPriority": ["..."],
  "score": 0-100
}}"#
    )
}

pub fn fix_prompt(issue: &FixIssue, context: &FixContext) -> String {
    format!(
        r#"You are a senior frontend developer who understands SEO and accessibility.

Issue to fix: {title}
Why it matters: {why}
Recommended solution: {fix}

Page context:
- Title: {page_title}
- Has buttons: {has_buttons}
- Has images: {has_images}
- Images missing alt: {missing_alt}

Generate production-ready, semantic, accessible, mobile-first code.

Return ONLY valid JSON:
{{
  "htmlCode": "...",
  "cssCode": "...",
  "javascriptCode": null,
  "schemaMarkup": null,
  "implementation": {{"steps": ["..."], "fileChanges": ["..."], "testing": ["..."]}},
  "explanation": {{"before": "...", "after": "...", "seoImpact": "...", "userImpact": "..."}}
}}"#,
        title = issue.title,
        why = issue.why,
        fix = issue.fix,
        page_title = context.page_title,
        has_buttons = yes_no(context.has_buttons),
        has_images = yes_no(context.has_images),
        missing_alt = context.images_missing_alt,
    )
}
