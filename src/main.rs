//! Larder main entry point
//!
//! This is the command-line interface for the Larder crawler and record
//! reconciler.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use larder::config::{load_config_with_hash, Config};
use larder::crawler::{build_http_client, Crawler};
use larder::dedup::{ContentDeduper, ReconcileSummary};
use larder::ledger::SeenLedger;
use larder::output::{
    print_crawl_statistics, print_dedup_analysis, print_reconcile_report, print_robots_summary,
    print_seen_stats, write_crawl_json,
};
use larder::robots::RobotsGate;
use larder::storage::SqliteContentStore;
use larder::url::canonicalize;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Larder: a polite recipe crawler and record reconciler
///
/// Larder crawls one site breadth-first while respecting robots.txt, and
/// removes duplicate records from the record store once they are indexed.
#[derive(Parser, Debug)]
#[command(name = "larder")]
#[command(version)]
#[command(about = "A polite recipe crawler and record reconciler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE", default_value = "larder.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the configured site
    Crawl {
        /// Start from this URL instead of the configured seed
        #[arg(long)]
        seed: Option<String>,

        /// Override the page budget
        #[arg(long)]
        max_pages: Option<usize>,

        /// Write the crawled pages to this JSON file
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Analyse duplicates in the record store without changing anything
    Check {
        /// Number of largest groups to list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Delete duplicate records and update the seen ledger
    Dedup {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Inspect or reset the seen ledger
    Seen {
        #[command(subcommand)]
        action: SeenAction,
    },

    /// Show the robots.txt rules of a site
    Robots {
        /// Any URL on the site
        url: String,

        /// Maximum number of rules to show
        #[arg(long, default_value_t = 20)]
        max_rules: usize,
    },
}

#[derive(Subcommand, Debug)]
enum SeenAction {
    /// Show how many titles are recorded
    Stats,
    /// Delete the ledger file
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::debug!("Configuration hash: {}", config_hash);

    match cli.command {
        Command::Crawl {
            seed,
            max_pages,
            output,
        } => handle_crawl(config, seed, max_pages, output).await,
        Command::Check { top } => handle_check(&config, top),
        Command::Dedup { yes } => handle_dedup(&config, yes),
        Command::Seen { action } => handle_seen(&config, action),
        Command::Robots { url, max_rules } => handle_robots(&config, &url, max_rules).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("larder=info,warn"),
            1 => EnvFilter::new("larder=debug,info"),
            2 => EnvFilter::new("larder=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Runs a crawl; Ctrl-C stops it before the next request
async fn handle_crawl(
    config: Config,
    seed: Option<String>,
    max_pages: Option<usize>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let seed = seed.unwrap_or_else(|| config.crawler.seed_url.clone());
    let max_pages = max_pages.unwrap_or(config.crawler.max_pages);
    if max_pages == 0 {
        bail!("--max-pages must be at least 1");
    }

    let stop = Arc::new(AtomicBool::new(false));
    let signal_flag = Arc::clone(&stop);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing current page");
            signal_flag.store(true, Ordering::SeqCst);
        }
    });

    let mut crawler = Crawler::from_config(&config)
        .context("Failed to build crawler")?
        .with_stop_flag(stop);
    let report = crawler
        .crawl(&seed, max_pages)
        .await
        .with_context(|| format!("Cannot crawl from {}", seed))?;

    print_crawl_statistics(&report);

    if let Some(path) = output {
        write_crawl_json(&path, &report.pages)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("\n✓ Results written to: {}", path.display());
    }

    Ok(())
}

fn open_store(config: &Config) -> anyhow::Result<SqliteContentStore> {
    let path = Path::new(&config.store.database_path);
    SqliteContentStore::new(path)
        .with_context(|| format!("Failed to open record store {}", path.display()))
}

/// Read-only duplicate analysis
fn handle_check(config: &Config, top: usize) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let plan = ContentDeduper::from_config(&config.store).inspect(&store)?;
    print_dedup_analysis(&plan, top);
    Ok(())
}

/// Removes duplicates after confirmation
fn handle_dedup(config: &Config, yes: bool) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    let ledger = SeenLedger::new(&config.ledger.path);
    let deduper = ContentDeduper::from_config(&config.store);

    let report = deduper.reconcile(&mut store, &ledger, |summary: &ReconcileSummary| {
        yes || prompt_for_deletion(summary)
    })?;

    print_reconcile_report(&report);
    Ok(())
}

/// Asks on stdin; anything but `yes` declines
fn prompt_for_deletion(summary: &ReconcileSummary) -> bool {
    println!("Total records: {}", summary.total);
    println!("Unique records: {}", summary.unique);
    println!(
        "To delete: {} ({:.1}% reduction)",
        summary.to_delete, summary.reduction_percent
    );
    print!("Type 'yes' to delete the duplicates: ");
    if std::io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(_) => answer.trim().eq_ignore_ascii_case("yes"),
        Err(e) => {
            tracing::warn!("Could not read answer: {}", e);
            false
        }
    }
}

fn handle_seen(config: &Config, action: SeenAction) -> anyhow::Result<()> {
    let ledger = SeenLedger::new(&config.ledger.path);
    match action {
        SeenAction::Stats => print_seen_stats(&ledger.load(), ledger.path(), 10),
        SeenAction::Clear => {
            if ledger.clear()? {
                println!("✓ Cleared {}", ledger.path().display());
            } else {
                println!("No ledger at {}", ledger.path().display());
            }
        }
    }
    Ok(())
}

async fn handle_robots(config: &Config, url: &str, max_rules: usize) -> anyhow::Result<()> {
    let target = canonicalize(url)?;
    let client = build_http_client(&config.user_agent)?;
    let gate = RobotsGate::new(
        client,
        Duration::from_secs(config.crawler.robots_timeout_secs),
        config.crawler.robots_failure,
    );

    let rules = gate
        .rule_summary(&target, max_rules)
        .await
        .with_context(|| format!("Failed to fetch robots.txt for {}", target))?;
    print_robots_summary(target.as_str(), &rules);
    Ok(())
}
