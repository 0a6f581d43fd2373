//! Output module for crawl exports and console reports
//!
//! This module handles:
//! - Writing the crawl result map as JSON for the ingestion step
//! - Printing crawl, duplicate and ledger statistics

mod json;
pub mod stats;

pub use json::write_crawl_json;
pub use stats::{
    print_crawl_statistics, print_dedup_analysis, print_reconcile_report, print_robots_summary,
    print_seen_stats, CrawlStatistics,
};

use thiserror::Error;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
