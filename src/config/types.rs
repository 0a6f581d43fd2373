use serde::Deserialize;

/// Main configuration structure for Larder
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL the breadth-first traversal starts from
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Maximum number of successfully fetched pages per run
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Fixed pause after every request (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Timeout for page fetches (seconds)
    #[serde(rename = "page-timeout-secs", default = "default_page_timeout_secs")]
    pub page_timeout_secs: u64,

    /// Timeout for robots.txt fetches (seconds)
    #[serde(rename = "robots-timeout-secs", default = "default_robots_timeout_secs")]
    pub robots_timeout_secs: u64,

    /// Upper bound on the extracted plain text, in characters
    #[serde(rename = "max-text-length", default = "default_max_text_length")]
    pub max_text_length: usize,

    /// What to do when robots.txt cannot be retrieved
    #[serde(rename = "robots-failure", default)]
    pub robots_failure: RobotsFailurePolicy,
}

/// Decision taken when a site's robots.txt is unreachable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RobotsFailurePolicy {
    /// Treat the site as allow-all (fail-open)
    #[default]
    Allow,
    /// Treat the site as disallow-all (fail-closed)
    Deny,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// Free-form comment rendered in parentheses
    #[serde(default = "default_comment")]
    pub comment: String,
}

impl UserAgentConfig {
    /// Renders the header value, e.g. `HybridSearchWorkshop/1.0 (Educational)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} ({})",
            self.crawler_name, self.crawler_version, self.comment
        )
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            comment: default_comment(),
        }
    }
}

/// Which link policy drives the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Generic,
    Site,
}

/// Link-following policy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub kind: PolicyKind,

    /// Substrings identifying detail pages
    #[serde(rename = "detail-markers", default = "default_detail_markers")]
    pub detail_markers: Vec<String>,

    /// Substrings identifying listing/category pages
    #[serde(rename = "listing-markers", default = "default_listing_markers")]
    pub listing_markers: Vec<String>,

    /// Host whose root page stays reachable
    #[serde(rename = "home-host", default = "default_home_host")]
    pub home_host: String,

    /// Suffix stripped from page titles
    #[serde(rename = "title-suffix", default = "default_title_suffix")]
    pub title_suffix: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            kind: PolicyKind::default(),
            detail_markers: default_detail_markers(),
            listing_markers: default_listing_markers(),
            home_host: default_home_host(),
            title_suffix: default_title_suffix(),
        }
    }
}

/// Seen-ledger configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_ledger_path")]
    pub path: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
        }
    }
}

/// Record store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database holding content records
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Page size used for full-table reads
    #[serde(rename = "read-page-size", default = "default_batch_size")]
    pub read_page_size: usize,

    /// Number of ids per delete call
    #[serde(rename = "delete-batch-size", default = "default_batch_size")]
    pub delete_batch_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            read_page_size: default_batch_size(),
            delete_batch_size: default_batch_size(),
        }
    }
}

fn default_max_pages() -> usize {
    20
}

fn default_request_delay_ms() -> u64 {
    500
}

fn default_page_timeout_secs() -> u64 {
    10
}

fn default_robots_timeout_secs() -> u64 {
    5
}

fn default_max_text_length() -> usize {
    5000
}

fn default_crawler_name() -> String {
    "HybridSearchWorkshop".to_string()
}

fn default_crawler_version() -> String {
    "1.0".to_string()
}

fn default_comment() -> String {
    "Educational".to_string()
}

fn default_detail_markers() -> Vec<String> {
    vec!["/recipe/".to_string(), "-recipe-".to_string()]
}

fn default_listing_markers() -> Vec<String> {
    vec!["/recipes/".to_string()]
}

fn default_home_host() -> String {
    "allrecipes.com".to_string()
}

fn default_title_suffix() -> String {
    " Recipe".to_string()
}

fn default_ledger_path() -> String {
    "data/seen_recipes.json".to_string()
}

fn default_database_path() -> String {
    "data/records.db".to_string()
}

fn default_batch_size() -> usize {
    300
}
