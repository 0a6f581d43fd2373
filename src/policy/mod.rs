//! Link-following and title policies
//!
//! A [`LinkPolicy`] decides which anchors are worth following and how a
//! page title is read. The trait's provided methods are the generic
//! behavior; a site policy composes over them by calling
//! [`base_is_valid_link`] / [`base_extract_title`] first and then
//! narrowing or rewriting the result.

mod site;

pub use site::SitePolicy;

use crate::config::{PolicyConfig, PolicyKind};
use scraper::{Html, Selector};
use url::Url;

/// Href prefixes that never lead to another page
const NON_NAVIGABLE_PREFIXES: &[&str] = &["#", "javascript:", "mailto:", "tel:"];

/// Site-specific traversal rules
///
/// Same-domain filtering is not a policy concern; the fetcher applies it
/// after a link is accepted here.
pub trait LinkPolicy: Send + Sync {
    /// Decides whether a raw `href` found on `base_url` should be followed
    fn is_valid_link(&self, href: &str, base_url: &Url) -> bool {
        base_is_valid_link(href, base_url)
    }

    /// Returns the title of the page at `url`
    fn extract_title(&self, url: &Url, document: &Html) -> String {
        base_extract_title(url, document)
    }
}

/// Rejects empty hrefs and non-navigable schemes; accepts everything else
pub fn base_is_valid_link(href: &str, _base_url: &Url) -> bool {
    let href = href.trim();
    if href.is_empty() {
        return false;
    }

    let lower = href.to_ascii_lowercase();
    !NON_NAVIGABLE_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

/// Returns the trimmed `<title>` text, or the URL when there is none
pub fn base_extract_title(url: &Url, document: &Html) -> String {
    let selector = match Selector::parse("title") {
        Ok(selector) => selector,
        Err(_) => return url.to_string(),
    };

    document
        .select(&selector)
        .next()
        .map(|element| {
            element
                .text()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_else(|| url.to_string())
}

/// The unrestricted policy: structural checks only
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericPolicy;

impl LinkPolicy for GenericPolicy {}

/// Builds the policy selected by the `[policy]` section
pub fn policy_from_config(config: &PolicyConfig) -> Box<dyn LinkPolicy> {
    match config.kind {
        PolicyKind::Generic => Box::new(GenericPolicy),
        PolicyKind::Site => Box::new(SitePolicy::new(
            config.detail_markers.clone(),
            config.listing_markers.clone(),
            config.home_host.clone(),
            config.title_suffix.clone(),
        )),
    }
}
