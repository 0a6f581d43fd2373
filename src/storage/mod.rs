//! Record store interface and SQLite adapter
//!
//! The dedup engine reads and deletes content records only through the
//! [`ContentStore`] trait:
//! - `get(offset, limit)` for paginated full-table reads
//! - `delete(ids)` with at most [`MAX_DELETE_BATCH`] ids per call
//! - `count()`
//!
//! [`SqliteContentStore`] is the bundled implementation.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteContentStore;
pub use traits::{ContentStore, StoreError, StoreResult};

use serde::{Deserialize, Serialize};

/// Hard upper bound on ids per delete call
pub const MAX_DELETE_BATCH: usize = 300;

/// Group key used when a record carries none
pub const UNKNOWN_GROUP: &str = "Unknown";

/// Kind used when a record carries none
pub const UNKNOWN_KIND: &str = "unknown";

/// Kind tag of the chunk holding an item's title
pub const TITLE_KIND: &str = "title";

/// One indexed chunk as stored
///
/// Two records hold the same content when `group_key`, `kind` and `body`
/// are equal; `id` and `source_url` play no part in that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: String,
    pub group_key: String,
    pub kind: String,
    pub body: String,
    pub source_url: Option<String>,
}

impl ContentRecord {
    pub fn new(
        id: impl Into<String>,
        group_key: impl Into<String>,
        kind: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            group_key: group_key.into(),
            kind: kind.into(),
            body: body.into(),
            source_url: None,
        }
    }

    pub fn with_source_url(mut self, source_url: impl Into<String>) -> Self {
        self.source_url = Some(source_url.into());
        self
    }

    pub fn is_title(&self) -> bool {
        self.kind == TITLE_KIND
    }
}

/// Metadata stored next to each record body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub group_key: Option<String>,
    pub kind: Option<String>,
    pub source_url: Option<String>,
}

/// One page of a full-table read, as parallel columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPage {
    pub ids: Vec<String>,
    pub bodies: Vec<String>,
    pub metadatas: Vec<RecordMetadata>,
}

impl RecordPage {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Zips the columns into records, filling missing metadata with the
    /// `Unknown`/`unknown` placeholders
    pub fn into_records(self) -> Vec<ContentRecord> {
        self.ids
            .into_iter()
            .zip(self.bodies)
            .zip(self.metadatas)
            .map(|((id, body), metadata)| ContentRecord {
                id,
                group_key: metadata
                    .group_key
                    .unwrap_or_else(|| UNKNOWN_GROUP.to_string()),
                kind: metadata.kind.unwrap_or_else(|| UNKNOWN_KIND.to_string()),
                body,
                source_url: metadata.source_url,
            })
            .collect()
    }
}
