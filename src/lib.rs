//! Larder: a polite, domain-scoped recipe crawler
//!
//! This crate implements a breadth-first crawler that stays on one site,
//! respects robots.txt and delegates link/title policy to pluggable rules,
//! together with a reconciliation engine that removes byte-identical
//! records from the record store and keeps a ledger of already-ingested
//! items.

pub mod config;
pub mod crawler;
pub mod dedup;
pub mod ledger;
pub mod output;
pub mod policy;
pub mod robots;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Larder operations
#[derive(Debug, Error)]
pub enum LarderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Store error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] ledger::LedgerError),

    #[error("Dedup error: {0}")]
    Dedup(#[from] dedup::DedupError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for Larder operations
pub type Result<T> = std::result::Result<T, LarderError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlReport, Crawler, PageData};
pub use dedup::{ContentDeduper, ReconcileReport};
pub use ledger::{SeenLedger, SeenSet};
pub use policy::{GenericPolicy, LinkPolicy, SitePolicy};
pub use robots::RobotsGate;
pub use url::{canonicalize, site_origin};
