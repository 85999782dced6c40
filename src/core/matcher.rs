//! Detail-link discovery in search-results markup.
//!
//! Anchors are visited in document order and the first one accepted by the
//! site's [`LinkMatcher`] wins. Text comparisons collapse whitespace and
//! ignore case, so `192  OLEAN\nAVE` matches `192 olean ave`. Addresses must
//! also sit on word boundaries: `1192 olean ave` does not match `192 olean ave`.

use crate::config::site::LinkMatcher;
use crate::utils::error::{LookupError, Result};
use scraper::{ElementRef, Html, Selector};
use url::Url;

pub const PREVIEW_CHARS: usize = 500;

pub fn find_detail_link(
    html: &str,
    page_url: &Url,
    matcher: &LinkMatcher,
    address: &str,
) -> Result<Option<Url>> {
    let document = Html::parse_document(html);
    let base = base_url(&document, page_url)?;
    let anchors = selector("a[href]")?;
    let address = normalize_text(address);

    for anchor in document.select(&anchors) {
        if !accepts(matcher, anchor, &address) {
            continue;
        }
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if let Some(url) = resolve_href(&base, href) {
            tracing::debug!("Matched detail link {}", url);
            return Ok(Some(url));
        }
        tracing::debug!("Skipping unusable href {:?}", href);
    }

    Ok(None)
}

fn accepts(matcher: &LinkMatcher, anchor: ElementRef<'_>, address: &str) -> bool {
    match matcher {
        LinkMatcher::Marker { text } => element_text(anchor).contains(&normalize_text(text)),
        LinkMatcher::AnchorAddress => contains_words(&element_text(anchor), address),
        LinkMatcher::RowAddress { marker } => {
            let in_row = enclosing_row(anchor)
                .map(|row| contains_words(&element_text(row), address))
                .unwrap_or(false);
            let marked = marker
                .as_ref()
                .map(|m| element_text(anchor).contains(&normalize_text(m)))
                .unwrap_or(true);
            in_row && marked
        }
    }
}

fn contains_words(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

fn enclosing_row(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "tr")
}

fn base_url(document: &Html, page_url: &Url) -> Result<Url> {
    let base = selector("base[href]")?;
    let resolved = document
        .select(&base)
        .next()
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| page_url.join(href.trim()).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"));
    Ok(resolved.unwrap_or_else(|| page_url.clone()))
}

/// Resolves `href` against `base`, keeping only http(s) targets.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("mailto:") {
        return None;
    }

    let url = base.join(href).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// First [`PREVIEW_CHARS`] characters of a page, for diagnostics.
pub fn page_preview(html: &str) -> String {
    html.chars().take(PREVIEW_CHARS).collect()
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| LookupError::ParseError {
        message: format!("invalid selector {:?}: {:?}", css, e),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize_text(&element.text().collect::<String>())
}

fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
