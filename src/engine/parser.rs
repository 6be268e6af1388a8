//! HTML link extraction
//!
//! Collects every URL a page references:
//! - `<a href>` and `<link href>`
//! - `<img src>`, `<script src>`, `<iframe src>` and `<source src>`
//!
//! HTTP(S) links are resolved against the page URL and lose their fragment.
//! Links with other schemes (`mailto:`, `tel:`, `data:`, `javascript:`, ...)
//! are returned verbatim so the engine can report them as skipped.
//! Fragment-only and empty references point at the page itself and are dropped.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements that reference other resources
const LINK_SELECTOR: &str =
    "a[href], link[href], img[src], script[src], iframe[src], source[src]";

/// Attribute holding the reference for an element matched by [`LINK_SELECTOR`]
fn link_attribute(tag: &str) -> &'static str {
    match tag {
        "a" | "link" => "href",
        _ => "src",
    }
}

/// Extracts the links referenced by an HTML page, in document order, without duplicates
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - URL of the page, used to resolve relative references
///
/// # Example
///
/// ```
/// use broken_links_checker::engine::extract_links;
/// use url::Url;
///
/// let base = Url::parse("http://localhost:1313/posts/").unwrap();
/// let html = r#"<a href="../about/">About</a><a href="mailto:me@example.com">Mail</a>"#;
/// assert_eq!(
///     extract_links(html, &base),
///     vec!["http://localhost:1313/about/", "mailto:me@example.com"]
/// );
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let base = document_base(&document, base_url);

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    let Ok(selector) = Selector::parse(LINK_SELECTOR) else {
        return links;
    };

    for element in document.select(&selector) {
        let element = element.value();
        if let Some(raw) = element.attr(link_attribute(element.name())) {
            if let Some(link) = resolve_link(raw, &base) {
                if seen.insert(link.clone()) {
                    links.push(link);
                }
            }
        }
    }

    links
}

/// Honours `<base href>` when the page declares one
fn document_base(document: &Html, page_url: &Url) -> Url {
    Selector::parse("base[href]")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|element| element.value().attr("href"))
                .and_then(|href| page_url.join(href.trim()).ok())
        })
        .unwrap_or_else(|| page_url.clone())
}

/// Resolves a reference found on a page
///
/// Returns None for references that point back at the page itself or cannot
/// be resolved.
fn resolve_link(raw: &str, base_url: &Url) -> Option<String> {
    let href = raw.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if has_foreign_scheme(href) {
        return Some(href.to_string());
    }

    let mut absolute = base_url.join(href).ok()?;
    absolute.set_fragment(None);
    Some(absolute.to_string())
}

/// True for `scheme:` references whose scheme is not http(s)
fn has_foreign_scheme(href: &str) -> bool {
    let Some((scheme, _)) = href.split_once(':') else {
        return false;
    };

    let is_scheme = !scheme.is_empty()
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    is_scheme && !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https")
}
