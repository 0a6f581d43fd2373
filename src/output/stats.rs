//! Console reports
//!
//! This module turns crawl reports, duplicate analyses and the seen ledger
//! into the plain-text summaries the command-line tool prints.

use crate::crawler::CrawlReport;
use crate::dedup::{DedupPlan, ReconcileOutcome, ReconcileReport};
use crate::ledger::SeenSet;
use std::path::Path;

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlStatistics {
    /// Pages fetched successfully
    pub pages: usize,

    /// URLs attempted
    pub visited: usize,

    /// Attempts that produced no page
    pub failed: usize,

    /// Same-site links across all fetched pages
    pub total_links: usize,

    /// Characters of extracted text across all fetched pages
    pub total_text_chars: usize,

    /// Whether the crawl was stopped early
    pub stopped: bool,
}

impl CrawlStatistics {
    pub fn from_report(report: &CrawlReport) -> Self {
        Self {
            pages: report.pages.len(),
            visited: report.visited,
            failed: report.failed,
            total_links: report.pages.values().map(|p| p.links.len()).sum(),
            total_text_chars: report.pages.values().map(|p| p.text.chars().count()).sum(),
            stopped: report.stopped,
        }
    }

    /// Share of attempts that produced a page, in percent
    pub fn success_rate(&self) -> f64 {
        if self.visited == 0 {
            0.0
        } else {
            self.pages as f64 / self.visited as f64 * 100.0
        }
    }
}

/// Prints crawl statistics to stdout
pub fn print_crawl_statistics(report: &CrawlReport) {
    let stats = CrawlStatistics::from_report(report);

    println!("=== Crawl Statistics ===\n");
    println!("  Pages crawled: {}", stats.pages);
    println!("  URLs visited: {}", stats.visited);
    println!("  Failed or blocked: {}", stats.failed);
    println!("  Links found: {}", stats.total_links);
    println!("  Text extracted: {} characters", stats.total_text_chars);
    println!(
        "  Success rate: {:.1}% ({} / {})",
        stats.success_rate(),
        stats.pages,
        stats.visited
    );
    if stats.stopped {
        println!("  Stopped early on request");
    }
}

/// Prints a read-only duplicate analysis
pub fn print_dedup_analysis(plan: &DedupPlan, top: usize) {
    println!("=== Duplicate Analysis ===\n");
    println!("  Total records: {}", plan.total);
    println!("  Unique records: {}", plan.unique());
    println!("  Duplicate records: {}", plan.duplicate_ids.len());
    println!("  Duplication rate: {:.1}%", plan.reduction_percent());
    println!("  Distinct source URLs: {}", plan.source_urls);
    println!("  Seen titles: {}", plan.titles.len());

    let groups = plan.top_groups(top);
    if !groups.is_empty() {
        println!("\nRecords per group (top {}):", groups.len());
        for (group, count) in groups {
            println!("  {}: {}", group, count);
        }
    }
}

/// Prints the outcome of a reconcile run
pub fn print_reconcile_report(report: &ReconcileReport) {
    match &report.outcome {
        ReconcileOutcome::EmptyStore => {
            println!("Record store is empty. Nothing to clean up.");
            return;
        }
        ReconcileOutcome::NothingToDelete => {
            println!("No duplicates found among {} records.", report.summary.total);
        }
        ReconcileOutcome::Declined => {
            println!("Deletion cancelled. No changes made.");
            return;
        }
        ReconcileOutcome::Deleted {
            batches,
            count_before,
            count_after,
        } => {
            println!(
                "Deleted {} duplicates in {} batches.",
                report.deleted(),
                batches.len()
            );
            println!("  Records before: {}", count_before);
            println!("  Records after: {}", count_after);
        }
    }
    println!(
        "Seen ledger: {} titles ({} new)",
        report.ledger_size, report.titles_added
    );
}

/// Prints the size and a sample of the seen ledger
pub fn print_seen_stats(seen: &SeenSet, path: &Path, sample: usize) {
    println!("Seen ledger: {}", path.display());
    println!("  Titles: {}", seen.len());
    for title in seen.iter().take(sample) {
        println!("  - {}", title);
    }
    if seen.len() > sample {
        println!("  ... and {} more", seen.len() - sample);
    }
}

/// Prints the relevant lines of a robots.txt file
pub fn print_robots_summary(url: &str, rules: &[String]) {
    println!("robots.txt for {}:", url);
    if rules.is_empty() {
        println!("  (no rules)");
    }
    for rule in rules {
        println!("  {}", rule);
    }
}
