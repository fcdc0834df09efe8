//! DOM extraction: HTML document -> PageSnapshot
//!
//! This module maps the static DOM of a page to the snapshot fields:
//! - Title, headings (h1-h6) and CTA-like buttons
//! - Link count and same-hostname links to follow
//! - Images with their alt text and declared dimensions
//! - Meta tags (description, keywords, viewport, charset, lang)
//! - Structural landmarks (header, nav, main, footer, forms)

use crate::snapshot::{
    Heading, ImageInfo, MetaInfo, PageSnapshot, StructureInfo, PLACEHOLDER_TITLE,
};
use crate::url::{resolve_asset, resolve_internal_link};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

const HEADINGS: &str = "h1, h2, h3, h4, h5, h6";
const BUTTONS: &str =
    "button, a[role='button'], input[type='button'], input[type='submit']";

/// Extracts a [`PageSnapshot`] from an HTML document
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `page_url` - Final URL of the page, used for link resolution
///
/// # Example
///
/// ```
/// use ux_scanner::renderer::extract_snapshot;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let page_url = Url::parse("https://example.com/").unwrap();
/// let snapshot = extract_snapshot(html, &page_url);
/// assert_eq!(snapshot.title, "Test");
/// assert_eq!(snapshot.internal_links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn extract_snapshot(html: &str, page_url: &Url) -> PageSnapshot {
    let document = Html::parse_document(html);

    let h1_count = select_all(&document, "h1").len();
    let (links_count, internal_links) = extract_links(&document, page_url);

    PageSnapshot {
        url: page_url.to_string(),
        title: extract_title(&document),
        headings: extract_headings(&document),
        buttons: extract_buttons(&document),
        links_count,
        internal_links,
        images: extract_images(&document, page_url),
        meta: MetaInfo {
            description: meta_content(&document, "description"),
            keywords: meta_content(&document, "keywords"),
            viewport: meta_content(&document, "viewport"),
            has_h1: h1_count > 0,
            h1_count,
            charset: extract_charset(&document),
            lang: first_attr(&document, "html", "lang"),
        },
        structure: StructureInfo {
            has_header: !select_all(&document, "header").is_empty(),
            has_nav: !select_all(&document, "nav").is_empty(),
            has_main: !select_all(&document, "main").is_empty(),
            has_footer: !select_all(&document, "footer").is_empty(),
            form_count: select_all(&document, "form").len(),
        },
    }
}

/// Selects every element matching `css`; an unparsable selector matches nothing
fn select_all<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(e) => {
            tracing::error!("Invalid selector '{}': {:?}", css, e);
            Vec::new()
        }
    }
}

/// Collapses all whitespace runs in an element's text
fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn attr_or_empty<'a>(element: &ElementRef<'a>, name: &str) -> &'a str {
    element.value().attr(name).unwrap_or("").trim()
}

fn first_attr(document: &Html, css: &str, attr: &str) -> String {
    select_all(document, css)
        .first()
        .and_then(|element| element.value().attr(attr))
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

fn extract_title(document: &Html) -> String {
    select_all(document, "title")
        .first()
        .map(element_text)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| PLACEHOLDER_TITLE.to_string())
}

fn extract_headings(document: &Html) -> Vec<Heading> {
    select_all(document, HEADINGS)
        .iter()
        .filter_map(|element| {
            let level = element
                .value()
                .name()
                .strip_prefix('h')
                .and_then(|n| n.parse::<u8>().ok())?;
            let text = element_text(element);
            (!text.is_empty()).then_some(Heading { level, text })
        })
        .collect()
}

fn extract_buttons(document: &Html) -> Vec<String> {
    select_all(document, BUTTONS)
        .iter()
        .filter_map(|element| {
            let text = element_text(element);
            if !text.is_empty() {
                return Some(text);
            }
            ["value", "aria-label"]
                .iter()
                .filter_map(|attr| element.value().attr(attr))
                .map(str::trim)
                .find(|label| !label.is_empty())
                .map(str::to_string)
        })
        .collect()
}

/// Returns the total `a[href]` count and the deduplicated internal links
fn extract_links(document: &Html, page_url: &Url) -> (usize, Vec<String>) {
    let anchors = select_all(document, "a[href]");
    let mut seen = HashSet::new();
    let mut internal = Vec::new();

    for element in &anchors {
        // Skip if it has the download attribute
        if element.value().attr("download").is_some() {
            continue;
        }
        if let Some(link) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_internal_link(href, page_url))
        {
            if seen.insert(link.clone()) {
                internal.push(link);
            }
        }
    }

    (anchors.len(), internal)
}

fn extract_images(document: &Html, page_url: &Url) -> Vec<ImageInfo> {
    select_all(document, "img")
        .iter()
        .map(|element| {
            let src = match attr_or_empty(element, "src") {
                "" => attr_or_empty(element, "data-src"),
                src => src,
            };
            ImageInfo {
                src: resolve_asset(src, page_url),
                alt: attr_or_empty(element, "alt").to_string(),
                width: attr_or_empty(element, "width").parse().unwrap_or(0),
                height: attr_or_empty(element, "height").parse().unwrap_or(0),
            }
        })
        .collect()
}

fn meta_content(document: &Html, name: &str) -> String {
    first_attr(document, &format!("meta[name='{}']", name), "content")
}

/// Reads `<meta charset>`, falling back to the http-equiv Content-Type declaration
fn extract_charset(document: &Html) -> String {
    let declared = first_attr(document, "meta[charset]", "charset");
    if !declared.is_empty() {
        return declared.to_uppercase();
    }

    let content_type = first_attr(document, "meta[http-equiv='Content-Type']", "content");
    content_type
        .split(';')
        .filter_map(|part| part.trim().strip_prefix("charset="))
        .next()
        .map(|charset| charset.trim().to_uppercase())
        .unwrap_or_default()
}
