//! Robots.txt parser implementation
//!
//! Matching is delegated to the robotstxt crate (a port of Google's
//! reference matcher): the longest matching rule wins and an `Allow` beats
//! a `Disallow` of equal length. Rules are always evaluated for the
//! wildcard agent `*`.

use robotstxt::DefaultMatcher;

/// Agent name rules are evaluated for
pub const WILDCARD_AGENT: &str = "*";

/// Directives worth showing when summarizing a robots.txt file
const SUMMARY_PREFIXES: &[&str] = &["user-agent:", "disallow:", "allow:", "sitemap:"];

/// Parsed robots.txt data
///
/// A thin wrapper holding the raw file body; the matcher re-parses it per
/// query, which is cheap for files of realistic size.
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content
    content: String,
    /// Set when the site has no usable robots.txt
    allow_all: bool,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// Used when a site answers robots.txt with a client error, meaning no
    /// exclusion rules exist.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    /// Checks if an absolute URL may be fetched by the wildcard agent
    pub fn is_allowed(&self, url: &str) -> bool {
        if self.allow_all || self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, WILDCARD_AGENT, url)
    }
}

/// Returns the first `max_rules` user-agent/allow/disallow/sitemap lines
///
/// Lines are trimmed; comments, blank lines and other directives are
/// skipped.
pub fn summarize_rules(content: &str, max_rules: usize) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| {
            let lower = line.to_lowercase();
            SUMMARY_PREFIXES.iter().any(|prefix| lower.starts_with(prefix))
        })
        .take(max_rules)
        .map(str::to_string)
        .collect()
}
