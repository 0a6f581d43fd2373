//! URL handling module for Larder
//!
//! This module provides the two URL primitives the crawler relies on:
//! canonicalization of discovered links and the site origin used for the
//! same-domain restriction and the robots.txt cache key.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{same_site, site_origin};
pub use normalize::canonicalize;
