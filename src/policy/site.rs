use crate::policy::{base_extract_title, base_is_valid_link, LinkPolicy};
use scraper::Html;
use url::Url;

/// A policy narrowed to one site's URL conventions
///
/// Only detail pages, listing pages and the site's home page are followed.
/// The generic structural check always runs first, so anything it rejects
/// stays rejected no matter what the markers say.
#[derive(Debug, Clone)]
pub struct SitePolicy {
    detail_markers: Vec<String>,
    listing_markers: Vec<String>,
    home_host: String,
    title_suffix: String,
}

impl SitePolicy {
    pub fn new(
        detail_markers: Vec<String>,
        listing_markers: Vec<String>,
        home_host: String,
        title_suffix: String,
    ) -> Self {
        Self {
            detail_markers: lowercase_all(detail_markers),
            listing_markers: lowercase_all(listing_markers),
            home_host: home_host.trim().to_ascii_lowercase(),
            title_suffix,
        }
    }

    /// Recipe pages (`/recipe/`, `-recipe-`), category pages (`/recipes/`)
    /// and the allrecipes.com home page
    pub fn allrecipes() -> Self {
        Self::new(
            vec!["/recipe/".to_string(), "-recipe-".to_string()],
            vec!["/recipes/".to_string()],
            "allrecipes.com".to_string(),
            " Recipe".to_string(),
        )
    }

    pub fn is_detail_link(&self, href: &str) -> bool {
        contains_any(href, &self.detail_markers)
    }

    pub fn is_listing_link(&self, href: &str) -> bool {
        contains_any(href, &self.listing_markers)
    }

    /// True when `href` resolves to the root path of the home host
    /// (with or without a `www.` prefix)
    pub fn is_home_link(&self, href: &str, base_url: &Url) -> bool {
        let Ok(resolved) = base_url.join(href.trim()) else {
            return false;
        };
        let Some(host) = resolved.host_str() else {
            return false;
        };

        let host = host.strip_prefix("www.").unwrap_or(host);
        host == self.home_host && resolved.path() == "/" && resolved.query().is_none()
    }
}

impl LinkPolicy for SitePolicy {
    fn is_valid_link(&self, href: &str, base_url: &Url) -> bool {
        if !base_is_valid_link(href, base_url) {
            return false;
        }

        self.is_detail_link(href) || self.is_listing_link(href) || self.is_home_link(href, base_url)
    }

    fn extract_title(&self, url: &Url, document: &Html) -> String {
        let title = base_extract_title(url, document);
        if self.title_suffix.is_empty() {
            return title;
        }
        title
            .strip_suffix(self.title_suffix.as_str())
            .unwrap_or(&title)
            .trim()
            .to_string()
    }
}

fn lowercase_all(markers: Vec<String>) -> Vec<String> {
    markers
        .into_iter()
        .map(|m| m.to_lowercase())
        .filter(|m| !m.is_empty())
        .collect()
}

fn contains_any(href: &str, markers: &[String]) -> bool {
    let href = href.to_lowercase();
    markers.iter().any(|marker| href.contains(marker.as_str()))
}
