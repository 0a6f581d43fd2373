//! Crawler coordinator - the breadth-first crawl loop
//!
//! This module owns the frontier, the visited set and the result map for a
//! single crawl, and drives the page fetcher with a fixed politeness delay
//! between requests.

use crate::config::Config;
use crate::crawler::fetcher::{FetchOutcome, PageFetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::PageData;
use crate::url::canonicalize;
use crate::LarderError;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Crawl results keyed by canonical URL
pub type CrawlMap = BTreeMap<String, PageData>;

/// Everything a crawl produced
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Successfully fetched pages, at most `max_pages` of them
    pub pages: CrawlMap,

    /// URLs dequeued and attempted, successful or not
    pub visited: usize,

    /// Attempts that produced no page (robots denial, HTTP or network error)
    pub failed: usize,

    /// Whether the stop flag ended the crawl early
    pub stopped: bool,
}

/// Breadth-first, single-site crawler
///
/// The HTTP client, the robots cache and the link policy belong to this
/// instance; independent crawlers share nothing.
pub struct Crawler {
    fetcher: PageFetcher,
    delay: Duration,
    stop: Option<Arc<AtomicBool>>,
}

impl Crawler {
    pub fn new(fetcher: PageFetcher, delay: Duration) -> Self {
        Self {
            fetcher,
            delay,
            stop: None,
        }
    }

    /// Builds a crawler with a fresh client, robots cache and policy
    pub fn from_config(config: &Config) -> Result<Self, LarderError> {
        let fetcher = PageFetcher::from_config(config)?;
        Ok(Self::new(
            fetcher,
            Duration::from_millis(config.crawler.request_delay_ms),
        ))
    }

    /// Installs a flag that, once set, ends the crawl before the next request
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::SeqCst))
    }

    /// Crawls breadth-first from `seed_url` until the frontier empties or
    /// `max_pages` pages were fetched
    ///
    /// # Arguments
    ///
    /// * `seed_url` - Absolute http(s) URL the crawl starts from
    /// * `max_pages` - Budget of successfully fetched pages
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Pages keyed by canonical URL plus counters
    /// * `Err(LarderError)` - `seed_url` is not a valid http(s) URL
    ///
    /// # Loop invariants
    ///
    /// - Every dequeued URL is marked visited before it is fetched, so a
    ///   failed fetch is never retried within the run.
    /// - After every fetch, successful or not, the loop sleeps the fixed
    ///   delay.
    /// - Links of a fetched page are enqueued only if not yet visited.
    ///
    /// A seed that is disallowed or unfetchable yields an empty report.
    /// Only a malformed seed URL is an error.
    pub async fn crawl(
        &mut self,
        seed_url: &str,
        max_pages: usize,
    ) -> Result<CrawlReport, LarderError> {
        let seed = canonicalize(seed_url)?;
        tracing::info!("Starting crawl at {} (max {} pages)", seed, max_pages);

        let mut frontier = Frontier::new(seed);
        let mut report = CrawlReport::default();

        while report.pages.len() < max_pages {
            if self.stop_requested() {
                tracing::info!("Stop requested, ending crawl");
                report.stopped = true;
                break;
            }

            let Some(url) = frontier.next_unvisited() else {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            };

            match self.fetcher.fetch_outcome(&url).await {
                FetchOutcome::Page(page) => {
                    enqueue_links(&mut frontier, &page);
                    tracing::info!(
                        "Crawled {}/{}: {} ({} in frontier)",
                        report.pages.len() + 1,
                        max_pages,
                        short_title(&page.title),
                        frontier.pending_len()
                    );
                    report.pages.insert(url.to_string(), page);
                }
                outcome => {
                    tracing::debug!("No page from {}: {:?}", url, outcome);
                    report.failed += 1;
                }
            }

            tokio::time::sleep(self.delay).await;
        }

        report.visited = frontier.visited_len();
        tracing::info!(
            "Crawled {} pages ({} visited, {} failed)",
            report.pages.len(),
            report.visited,
            report.failed
        );

        Ok(report)
    }
}

fn enqueue_links(frontier: &mut Frontier, page: &PageData) {
    for link in &page.links {
        match Url::parse(link) {
            Ok(url) => {
                frontier.push(url);
            }
            Err(e) => tracing::debug!("Skipping unparsable link {}: {}", link, e),
        }
    }
}

/// First 25 characters of a title, for progress lines
fn short_title(title: &str) -> String {
    let mut short: String = title.chars().take(25).collect();
    if title.chars().count() > 25 {
        short.push_str("...");
    }
    short
}
