//! Storage trait and error types
//!
//! This module defines the interface the dedup engine needs from a record
//! store, and nothing more.

use crate::storage::{RecordPage, MAX_DELETE_BATCH};
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Delete batch of {size} ids exceeds the store limit of {max}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A record store the dedup engine can read back and prune
///
/// Implementations must return records from `get` in a stable order across
/// calls so that offsets page through the table without gaps or repeats.
pub trait ContentStore {
    /// Total number of records
    fn count(&self) -> StoreResult<u64>;

    /// Reads up to `limit` records starting at `offset`
    fn get(&self, offset: usize, limit: usize) -> StoreResult<RecordPage>;

    /// Deletes the given ids as one transaction
    ///
    /// Fails without deleting anything when `ids` is longer than
    /// [`max_delete_batch`](Self::max_delete_batch).
    fn delete(&mut self, ids: &[String]) -> StoreResult<()>;

    /// Largest batch `delete` accepts
    fn max_delete_batch(&self) -> usize {
        MAX_DELETE_BATCH
    }
}
