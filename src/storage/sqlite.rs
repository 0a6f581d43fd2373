//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ContentStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ContentStore, StoreError, StoreResult};
use crate::storage::{ContentRecord, RecordMetadata, RecordPage, MAX_DELETE_BATCH};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;

/// SQLite record store
pub struct SqliteContentStore {
    conn: Connection,
}

impl SqliteContentStore {
    /// Opens or creates the database at `path`
    ///
    /// Parent directories are created as needed.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteContentStore)` - Successfully opened/created database
    /// * `Err(StoreError)` - The directory or database could not be opened
    pub fn new(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Inserts a single record
    ///
    /// Fails if a record with the same id already exists.
    pub fn insert(&mut self, record: &ContentRecord) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO records (id, group_key, kind, body, source_url, inserted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id,
                record.group_key,
                record.kind,
                record.body,
                record.source_url,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    /// Inserts records in one transaction, returning how many were written
    pub fn insert_many(&mut self, records: &[ContentRecord]) -> StoreResult<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO records (id, group_key, kind, body, source_url, inserted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.id,
                    record.group_key,
                    record.kind,
                    record.body,
                    record.source_url,
                    now
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }
}

impl ContentStore for SqliteContentStore {
    fn count(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn get(&self, offset: usize, limit: usize) -> StoreResult<RecordPage> {
        let mut stmt = self.conn.prepare(
            "SELECT id, body, group_key, kind, source_url FROM records
             ORDER BY id LIMIT ?1 OFFSET ?2",
        )?;

        let rows = stmt.query_map(params![limit as i64, offset as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                RecordMetadata {
                    group_key: row.get(2)?,
                    kind: row.get(3)?,
                    source_url: row.get(4)?,
                },
            ))
        })?;

        let mut page = RecordPage::default();
        for row in rows {
            let (id, body, metadata) = row?;
            page.ids.push(id);
            page.bodies.push(body);
            page.metadatas.push(metadata);
        }
        Ok(page)
    }

    fn delete(&mut self, ids: &[String]) -> StoreResult<()> {
        if ids.len() > MAX_DELETE_BATCH {
            return Err(StoreError::BatchTooLarge {
                size: ids.len(),
                max: MAX_DELETE_BATCH,
            });
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare("DELETE FROM records WHERE id = ?1")?;
            for id in ids {
                stmt.execute(params![id])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
