//! HTML extraction for fetched pages
//!
//! This module turns a response body into a [`PageData`]:
//! - title, via the active link policy
//! - plain text, with non-content elements removed and a length cap
//! - same-site links, filtered by the policy and de-duplicated

use crate::policy::LinkPolicy;
use crate::url::{canonicalize, same_site};
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Elements whose text never counts as page content
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "nav", "footer", "header"];

/// One successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageData {
    /// Canonical absolute URL; the key of the crawl result map
    pub url: String,

    /// Page title as read by the link policy
    pub title: String,

    /// Plain-text extract, at most the configured number of characters
    pub text: String,

    /// Same-site absolute links in first-seen order, without duplicates
    pub links: Vec<String>,
}

/// Parses a response body and extracts everything the crawler keeps
///
/// # Example
///
/// ```
/// use larder::crawler::extract_page;
/// use larder::policy::GenericPolicy;
/// use url::Url;
///
/// let html = r#"<html><head><title>Soup</title></head><body><a href="/stew">Stew</a></body></html>"#;
/// let url = Url::parse("https://example.com/soup").unwrap();
/// let page = extract_page(&url, html, &GenericPolicy, 5000);
/// assert_eq!(page.title, "Soup");
/// assert_eq!(page.links, vec!["https://example.com/stew".to_string()]);
/// ```
pub fn extract_page(
    url: &Url,
    html: &str,
    policy: &dyn LinkPolicy,
    max_text_length: usize,
) -> PageData {
    let document = Html::parse_document(html);

    PageData {
        url: url.to_string(),
        title: policy.extract_title(url, &document),
        text: extract_text(&document, max_text_length),
        links: extract_links(&document, url, policy),
    }
}

/// Collects visible text, skipping script/style/nav/footer/header subtrees
///
/// Each text node is trimmed, empty ones are dropped, and the rest are
/// joined with single spaces before truncating to `max_chars` characters.
pub fn extract_text(document: &Html, max_chars: usize) -> String {
    let mut pieces = Vec::new();
    collect_text(document.root_element(), &mut pieces);
    pieces.join(" ").chars().take(max_chars).collect()
}

fn collect_text(element: ElementRef<'_>, out: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    out.push(trimmed.to_string());
                }
            }
            Node::Element(el) => {
                if SKIPPED_ELEMENTS.contains(&el.name()) {
                    continue;
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
            }
            _ => {}
        }
    }
}

/// Extracts followable links from `<a href>` elements
///
/// An href is kept when the policy accepts it, it resolves against
/// `page_url` to an http(s) URL, and that URL is on the same site as the
/// page. Fragments are dropped; the first occurrence wins.
pub fn extract_links(document: &Html, page_url: &Url, policy: &dyn LinkPolicy) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if !policy.is_valid_link(href, page_url) {
            continue;
        }

        let Ok(resolved) = page_url.join(href.trim()) else {
            tracing::trace!("Unresolvable href {:?} on {}", href, page_url);
            continue;
        };
        let Ok(link) = canonicalize(resolved.as_str()) else {
            continue;
        };
        if !same_site(&link, page_url) {
            continue;
        }

        let link = link.to_string();
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }

    links
}
