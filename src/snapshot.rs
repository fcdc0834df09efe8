//! Page snapshot data model
//!
//! A [`PageSnapshot`] is the structured extraction of one rendered page. It is
//! produced by a [`crate::renderer::RenderSession`] and consumed by every
//! downstream stage (crawler, analyzer, fallback scorer, aggregator).

use serde::{Deserialize, Serialize};

/// Title recorded when a page has no `<title>` text
pub const PLACEHOLDER_TITLE: &str = "No title";

/// Structured snapshot of one rendered page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    /// Canonical URL after redirects
    pub url: String,
    pub title: String,
    /// Headings in document order; entries with empty text are excluded
    pub headings: Vec<Heading>,
    /// Visible labels of interactive/CTA elements
    pub buttons: Vec<String>,
    pub links_count: usize,
    /// Same-hostname links in discovery order, without duplicates
    pub internal_links: Vec<String>,
    pub images: Vec<ImageInfo>,
    pub meta: MetaInfo,
    pub structure: StructureInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// 1..=6
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageInfo {
    pub src: String,
    pub alt: String,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    pub fn is_missing_alt(&self) -> bool {
        self.alt.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaInfo {
    pub description: String,
    pub keywords: String,
    pub viewport: String,
    /// Always equal to `h1_count > 0`
    #[serde(rename = "hasH1")]
    pub has_h1: bool,
    #[serde(rename = "h1Count")]
    pub h1_count: usize,
    pub charset: String,
    pub lang: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureInfo {
    pub has_header: bool,
    pub has_nav: bool,
    pub has_main: bool,
    pub has_footer: bool,
    pub form_count: usize,
}

impl StructureInfo {
    /// True when the page uses header, main and footer landmarks
    pub fn has_semantic_layout(&self) -> bool {
        self.has_header && self.has_main && self.has_footer
    }
}

impl PageSnapshot {
    /// Creates an empty snapshot for `url` with the placeholder title
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: PLACEHOLDER_TITLE.to_string(),
            headings: Vec::new(),
            buttons: Vec::new(),
            links_count: 0,
            internal_links: Vec::new(),
            images: Vec::new(),
            meta: MetaInfo::default(),
            structure: StructureInfo::default(),
        }
    }

    /// True when the title is missing or the placeholder
    pub fn has_placeholder_title(&self) -> bool {
        let title = self.title.trim();
        title.is_empty() || title == PLACEHOLDER_TITLE
    }

    /// Number of images whose alt text is empty
    pub fn images_missing_alt(&self) -> usize {
        self.images.iter().filter(|img| img.is_missing_alt()).count()
    }
}
