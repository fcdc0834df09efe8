//! URL handling for the scanner
//!
//! Validates scan targets at the request boundary and classifies hrefs found
//! on a page as internal (same hostname, crawlable) or not.

use crate::{UrlError, UrlResult};
use url::Url;

/// Validates a scan target
///
/// The target must be present and parse as an absolute HTTP(S) URL with a host.
///
/// # Examples
///
/// ```
/// use ux_scanner::url::parse_scan_url;
///
/// let url = parse_scan_url(Some("https://example.com/about")).unwrap();
/// assert_eq!(url.host_str(), Some("example.com"));
/// assert!(parse_scan_url(Some("not a url")).is_err());
/// assert!(parse_scan_url(None).is_err());
/// ```
pub fn parse_scan_url(input: Option<&str>) -> UrlResult<Url> {
    let raw = input.map(str::trim).filter(|s| !s.is_empty()).ok_or(UrlError::Missing)?;

    let url = Url::parse(raw).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Resolves an href found on `page_url` and keeps it only if it is internal
///
/// Returns None if the link should be excluded:
/// - empty hrefs
/// - `mailto:` and `tel:` links, anywhere in the href
/// - links carrying a fragment (`#`), including same-page anchors
/// - non-HTTP(S) URLs after resolution
/// - links to a different hostname
pub fn resolve_internal_link(href: &str, page_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.contains('#') || href.contains("mailto:") || href.contains("tel:") {
        return None;
    }

    let resolved = page_url.join(href).ok()?;

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }

    if resolved.host_str() != page_url.host_str() {
        return None;
    }

    Some(resolved.to_string())
}

/// Resolves an asset reference (e.g. an image src) to an absolute URL string
pub fn resolve_asset(src: &str, page_url: &Url) -> String {
    let src = src.trim();
    if src.is_empty() {
        return String::new();
    }
    page_url
        .join(src)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| src.to_string())
}
