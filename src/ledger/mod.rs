//! Durable set of already-ingested item identifiers
//!
//! The ledger file is a UTF-8 JSON array of strings, sorted ascending and
//! pretty-printed. Loading never fails the caller: a missing, empty or
//! corrupt file yields an empty set. Saving always rewrites the whole file.
//!
//! The ledger has no locking. One caller must own the full
//! load -> mutate -> save sequence.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Identifiers compared by exact string equality, iterated in sorted order
pub type SeenSet = BTreeSet<String>;

/// Errors raised while writing or clearing the ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Failed to write ledger {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize ledger: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to remove ledger {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// File-backed seen-set
#[derive(Debug, Clone)]
pub struct SeenLedger {
    path: PathBuf,
}

impl SeenLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted set
    ///
    /// # Returns
    ///
    /// The stored identifiers. Never fails; unusable files yield an empty
    /// set:
    ///
    /// | File state | Result |
    /// |------------|--------|
    /// | missing | empty set |
    /// | empty or whitespace | empty set |
    /// | not a JSON array of strings | empty set, warning logged |
    /// | unreadable | empty set, warning logged |
    pub fn load(&self) -> SeenSet {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return SeenSet::new(),
            Err(e) => {
                tracing::warn!(
                    "Could not read ledger {}: {}, starting empty",
                    self.path.display(),
                    e
                );
                return SeenSet::new();
            }
        };

        if content.trim().is_empty() {
            return SeenSet::new();
        }

        match serde_json::from_str::<Vec<String>>(&content) {
            Ok(items) => items.into_iter().collect(),
            Err(e) => {
                tracing::warn!(
                    "Ledger {} is corrupted ({}), starting empty",
                    self.path.display(),
                    e
                );
                SeenSet::new()
            }
        }
    }

    /// Overwrites the ledger with `seen`, sorted, creating parent
    /// directories as needed
    ///
    /// # Arguments
    ///
    /// * `seen` - The complete set to persist; the file is replaced, not
    ///   appended to
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The file now holds exactly `seen` as a pretty JSON array
    /// * `Err(LedgerError)` - The directory or file could not be written
    pub fn save(&self, seen: &SeenSet) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| LedgerError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        let items: Vec<&String> = seen.iter().collect();
        let json = serde_json::to_string_pretty(&items)?;
        std::fs::write(&self.path, json).map_err(|source| LedgerError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!("Saved {} seen items to {}", seen.len(), self.path.display());
        Ok(())
    }

    /// Deletes the ledger file, returning whether one existed
    pub fn clear(&self) -> Result<bool, LedgerError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("Cleared ledger {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(LedgerError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// Adds `titles` to `seen`, returning how many were new
pub fn record_titles<I, S>(seen: &mut SeenSet, titles: I) -> usize
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut added = 0;
    for title in titles {
        if seen.insert(title.into()) {
            added += 1;
        }
    }
    added
}
