//! Breadth-first crawl frontier
//!
//! A FIFO queue of URLs waiting to be visited plus the set of URLs already
//! taken off it. The visited set is the only record of "already handled":
//! the queue may hold the same URL several times, and extra copies are
//! discarded when they reach the front.

use std::collections::{HashSet, VecDeque};
use url::Url;

#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<Url>,
    visited: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier holding only the seed
    pub fn new(seed: Url) -> Self {
        let mut frontier = Self::default();
        frontier.queue.push_back(seed);
        frontier
    }

    /// Enqueues a URL unless it has already been visited
    ///
    /// Returns whether the URL was enqueued.
    pub fn push(&mut self, url: Url) -> bool {
        if self.visited.contains(url.as_str()) {
            return false;
        }
        self.queue.push_back(url);
        true
    }

    /// Dequeues the next URL not yet visited and marks it visited
    ///
    /// Each URL is returned at most once over the frontier's lifetime.
    pub fn next_unvisited(&mut self) -> Option<Url> {
        while let Some(url) = self.queue.pop_front() {
            if self.visited.insert(url.as_str().to_string()) {
                return Some(url);
            }
        }
        None
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Number of URLs taken off the queue so far
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Number of queued entries, duplicates included
    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
