//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building the shared HTTP client with the identifying user agent
//! - The robots.txt check that precedes every request
//! - Classifying responses into pages and non-fatal failures

use crate::config::{Config, UserAgentConfig};
use crate::crawler::parser::{extract_page, PageData};
use crate::policy::{policy_from_config, LinkPolicy};
use crate::robots::RobotsGate;
use crate::LarderError;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchOutcome {
    /// Successfully fetched and parsed the page
    Page(PageData),

    /// robots.txt disallows the URL; no request was sent
    Disallowed,

    /// The server answered with something other than 200 OK
    HttpStatus {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, unreadable body)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchOutcome {
    /// Converts to the page, dropping the failure detail
    pub fn into_page(self) -> Option<PageData> {
        match self {
            FetchOutcome::Page(page) => Some(page),
            _ => None,
        }
    }
}

/// Builds the HTTP client shared by page and robots.txt requests
///
/// The client keeps a connection pool for the lifetime of the crawler.
/// Per-request timeouts are applied by the callers.
///
/// # Example
///
/// ```no_run
/// use larder::config::UserAgentConfig;
/// use larder::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches single pages: robots check, one GET, extraction
pub struct PageFetcher {
    client: Client,
    robots: RobotsGate,
    policy: Box<dyn LinkPolicy>,
    timeout: Duration,
    max_text_length: usize,
}

impl PageFetcher {
    pub fn new(
        client: Client,
        robots: RobotsGate,
        policy: Box<dyn LinkPolicy>,
        timeout: Duration,
        max_text_length: usize,
    ) -> Self {
        Self {
            client,
            robots,
            policy,
            timeout,
            max_text_length,
        }
    }

    /// Builds a fetcher, its client and its robots gate from configuration
    pub fn from_config(config: &Config) -> Result<Self, LarderError> {
        let client = build_http_client(&config.user_agent)?;
        let robots = RobotsGate::new(
            client.clone(),
            Duration::from_secs(config.crawler.robots_timeout_secs),
            config.crawler.robots_failure,
        );

        Ok(Self::new(
            client,
            robots,
            policy_from_config(&config.policy),
            Duration::from_secs(config.crawler.page_timeout_secs),
            config.crawler.max_text_length,
        ))
    }

    /// Fetches a page, returning `None` on any failure
    ///
    /// # Arguments
    ///
    /// * `url` - Canonical URL of the page
    ///
    /// # Returns
    ///
    /// * `Some(PageData)` - robots.txt allowed the URL and it answered 200
    /// * `None` - Disallowed, non-200 status, or network error (logged)
    pub async fn fetch(&mut self, url: &Url) -> Option<PageData> {
        self.fetch_outcome(url).await.into_page()
    }

    /// Fetches a page and reports why it failed, if it did
    ///
    /// # Request Flow
    ///
    /// | Condition | Outcome |
    /// |-----------|---------|
    /// | robots.txt disallows | `Disallowed`, nothing requested |
    /// | 200 OK | `Page` |
    /// | any other status | `HttpStatus` |
    /// | timeout / connect / body error | `NetworkError` |
    ///
    /// None of these are errors to the caller; a crawl always continues.
    pub async fn fetch_outcome(&mut self, url: &Url) -> FetchOutcome {
        if !self.robots.can_fetch(url).await {
            tracing::info!("[robots.txt blocked] {}", url);
            return FetchOutcome::Disallowed;
        }

        let response = match self
            .client
            .get(url.as_str())
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let error = if e.is_timeout() {
                    "Request timeout".to_string()
                } else if e.is_connect() {
                    "Connection refused".to_string()
                } else {
                    e.to_string()
                };
                tracing::warn!("[Error] {}: {}", url, error);
                return FetchOutcome::NetworkError { error };
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!("[HTTP {}] {}", status.as_u16(), url);
            return FetchOutcome::HttpStatus {
                status_code: status.as_u16(),
            };
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("[Error] {}: failed to read body: {}", url, e);
                return FetchOutcome::NetworkError {
                    error: e.to_string(),
                };
            }
        };

        FetchOutcome::Page(extract_page(
            url,
            &body,
            &*self.policy,
            self.max_text_length,
        ))
    }

    /// The robots gate owned by this fetcher
    pub fn robots(&self) -> &RobotsGate {
        &self.robots
    }
}
