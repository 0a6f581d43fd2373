//! JSON export of crawl results
//!
//! The file is a single object mapping each canonical URL to
//! `{url, title, text, links}`, keys in ascending order.

use crate::crawler::CrawlMap;
use crate::output::OutputResult;
use std::path::Path;

/// Writes `pages` as pretty-printed JSON, creating parent directories
///
/// # Arguments
///
/// * `path` - Destination file, overwritten if present
/// * `pages` - Crawl results keyed by canonical URL
pub fn write_crawl_json(path: &Path, pages: &CrawlMap) -> OutputResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(pages)?;
    std::fs::write(path, json)?;

    tracing::info!("Wrote {} pages to {}", pages.len(), path.display());
    Ok(())
}
