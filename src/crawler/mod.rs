//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching gated by robots.txt
//! - HTML parsing with text and link extraction
//! - The breadth-first frontier
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{CrawlMap, CrawlReport, Crawler};
pub use fetcher::{build_http_client, FetchOutcome, PageFetcher};
pub use frontier::Frontier;
pub use parser::{extract_links, extract_page, extract_text, PageData};

use crate::config::Config;
use crate::LarderError;

/// Runs a complete crawl from the configured seed
///
/// # Example
///
/// ```no_run
/// use larder::config::load_config;
/// use larder::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("larder.toml"))?;
/// let report = crawl(&config).await?;
/// println!("{} pages", report.pages.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: &Config) -> Result<CrawlReport, LarderError> {
    let mut crawler = Crawler::from_config(config)?;
    crawler
        .crawl(&config.crawler.seed_url, config.crawler.max_pages)
        .await
}
