//! Database schema definitions
//!
//! This module contains the SQL schema for the record store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per indexed content chunk
CREATE TABLE IF NOT EXISTS records (
    id TEXT PRIMARY KEY,
    group_key TEXT,
    kind TEXT,
    body TEXT NOT NULL,
    source_url TEXT,
    inserted_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_records_group ON records(group_key);
CREATE INDEX IF NOT EXISTS idx_records_kind ON records(kind);
"#;

/// Initializes the database schema
///
/// Safe to call on an existing database.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}
