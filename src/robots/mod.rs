//! Robots.txt handling module
//!
//! This module provides fetching, parsing, and per-crawler caching of
//! robots.txt files. [`RobotsGate`] is the single permission check the
//! page fetcher consults before every request.

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsCache};
pub use parser::{summarize_rules, ParsedRobots, WILDCARD_AGENT};

use crate::config::RobotsFailurePolicy;
use crate::url::site_origin;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Outcome of a single robots.txt request
#[derive(Debug)]
enum RobotsFetch {
    /// 2xx response: rules to parse and cache
    Rules(ParsedRobots),
    /// 4xx response: the site publishes no rules
    Missing,
    /// 5xx response or transport failure
    Unavailable(String),
}

/// Per-origin robots.txt permission check
///
/// # Caching
///
/// | robots.txt response | Decision | Cached |
/// |---------------------|----------|--------|
/// | 2xx | parsed rules | yes |
/// | 4xx | allow all | yes |
/// | 5xx / network error | failure policy (allow by default) | no |
///
/// Unavailable files are never cached, so the next check for the same
/// origin probes the site again.
pub struct RobotsGate {
    client: Client,
    timeout: Duration,
    on_failure: RobotsFailurePolicy,
    cache: RobotsCache,
}

impl RobotsGate {
    /// Creates a gate sharing the crawler's HTTP client
    pub fn new(client: Client, timeout: Duration, on_failure: RobotsFailurePolicy) -> Self {
        Self {
            client,
            timeout,
            on_failure,
            cache: RobotsCache::new(),
        }
    }

    /// Checks whether `url` may be fetched under its site's robots.txt
    pub async fn can_fetch(&mut self, url: &Url) -> bool {
        let origin = site_origin(url);

        if let Some(cached) = self.cache.get(&origin) {
            tracing::debug!(
                "Using cached robots.txt for {} (age {}s)",
                origin,
                cached.age().num_seconds()
            );
            return cached.content.is_allowed(url.as_str());
        }

        match fetch_robots(&self.client, &origin, self.timeout).await {
            RobotsFetch::Rules(robots) => {
                let allowed = robots.is_allowed(url.as_str());
                self.cache.insert(&origin, robots);
                allowed
            }
            RobotsFetch::Missing => {
                tracing::debug!("No robots.txt for {}, allowing all", origin);
                self.cache.insert(&origin, ParsedRobots::allow_all());
                true
            }
            RobotsFetch::Unavailable(reason) => {
                let allowed = self.on_failure == RobotsFailurePolicy::Allow;
                tracing::warn!(
                    "robots.txt unavailable for {} ({}), {} {}",
                    origin,
                    reason,
                    if allowed { "allowing" } else { "denying" },
                    url
                );
                allowed
            }
        }
    }

    /// Number of origins with cached rules
    pub fn cached_origins(&self) -> usize {
        self.cache.len()
    }

    /// Fetches a site's robots.txt and returns its most relevant lines
    ///
    /// Bypasses the cache; meant for inspecting a site before crawling it.
    pub async fn rule_summary(
        &self,
        url: &Url,
        max_rules: usize,
    ) -> Result<Vec<String>, reqwest::Error> {
        let robots_url = format!("{}/robots.txt", site_origin(url));
        let body = self
            .client
            .get(&robots_url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(summarize_rules(&body, max_rules))
    }
}

/// Fetches and classifies `{origin}/robots.txt`
async fn fetch_robots(client: &Client, origin: &str, timeout: Duration) -> RobotsFetch {
    let robots_url = format!("{}/robots.txt", origin);
    tracing::debug!("Fetching robots.txt: {}", robots_url);

    let response = match client.get(&robots_url).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => return RobotsFetch::Unavailable(e.to_string()),
    };

    let status = response.status();
    if status.is_client_error() {
        return RobotsFetch::Missing;
    }
    if !status.is_success() {
        return RobotsFetch::Unavailable(format!("HTTP {}", status.as_u16()));
    }

    match response.text().await {
        Ok(body) => RobotsFetch::Rules(ParsedRobots::from_content(&body)),
        Err(e) => RobotsFetch::Unavailable(e.to_string()),
    }
}
