//! Integration tests for duplicate reconciliation
//!
//! These tests run the deduper against an on-disk SQLite record store and
//! a ledger file in a temporary directory, plus a scripted store for
//! failure cases.

use larder::dedup::{BatchOutcome, ContentDeduper, DedupError, ReconcileOutcome, ReconcileSummary};
use larder::ledger::SeenLedger;
use larder::storage::{
    ContentRecord, ContentStore, RecordMetadata, RecordPage, SqliteContentStore, StoreError,
    StoreResult,
};
use tempfile::TempDir;

/// Four recipes, each indexed twice, plus one chunk indexed once
fn recipe_records() -> Vec<ContentRecord> {
    let mut records = Vec::new();
    for (copy, prefix) in ["a", "b"].iter().enumerate() {
        for recipe in ["Apple Pie", "Beef Stew", "Carrot Cake", "Dal"] {
            let slug = recipe.to_lowercase().replace(' ', "-");
            let url = format!("https://example.com/recipe/{}", slug);
            records.push(
                ContentRecord::new(format!("{}-{}-title", prefix, slug), recipe, "title", recipe)
                    .with_source_url(url.clone()),
            );
            records.push(
                ContentRecord::new(
                    format!("{}-{}-ingredients", prefix, slug),
                    recipe,
                    "ingredients",
                    format!("Ingredients for {}", recipe),
                )
                .with_source_url(url),
            );
        }
        if copy == 0 {
            records.push(ContentRecord::new("a-dal-nutrition", "Dal", "nutrition", "200 kcal"));
        }
    }
    records
}

fn open_store(dir: &TempDir) -> SqliteContentStore {
    SqliteContentStore::new(&dir.path().join("data").join("records.db")).expect("open store")
}

#[test]
fn test_reconcile_against_sqlite_store() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    store.insert_many(&recipe_records()).unwrap();
    let ledger = SeenLedger::new(dir.path().join("data").join("seen_recipes.json"));

    let deduper = ContentDeduper::new(3, 300);
    let report = deduper
        .reconcile(&mut store, &ledger, |summary: &ReconcileSummary| {
            summary.to_delete == 8
        })
        .unwrap();

    assert_eq!(report.summary.total, 17);
    assert_eq!(report.summary.unique, 9);
    assert!(report.plan.duplicate_ids.iter().all(|id| id.starts_with("b-")));
    assert!(matches!(
        report.outcome,
        ReconcileOutcome::Deleted {
            count_before: 17,
            count_after: 9,
            ..
        }
    ));

    let seen: Vec<String> = ledger.load().into_iter().collect();
    assert_eq!(seen, vec!["Apple Pie", "Beef Stew", "Carrot Cake", "Dal"]);

    // Store reopened from disk sees the same result
    drop(store);
    let store = open_store(&dir);
    assert_eq!(store.count().unwrap(), 9);
}

#[test]
fn test_second_reconcile_finds_nothing() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    store.insert_many(&recipe_records()).unwrap();
    let ledger = SeenLedger::new(dir.path().join("seen.json"));
    let deduper = ContentDeduper::default();

    deduper
        .reconcile(&mut store, &ledger, |_: &ReconcileSummary| true)
        .unwrap();
    let ledger_bytes = std::fs::read(ledger.path()).unwrap();

    let second = deduper
        .reconcile(&mut store, &ledger, |_: &ReconcileSummary| true)
        .unwrap();

    assert_eq!(second.outcome, ReconcileOutcome::NothingToDelete);
    assert_eq!(second.deleted(), 0);
    assert_eq!(std::fs::read(ledger.path()).unwrap(), ledger_bytes);
}

#[test]
fn test_inspect_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    store.insert_many(&recipe_records()).unwrap();

    let plan = ContentDeduper::default().inspect(&store).unwrap();

    assert_eq!(plan.total, 17);
    assert_eq!(plan.duplicate_ids.len(), 8);
    assert_eq!(plan.source_urls, 4);
    assert_eq!(plan.top_groups(1), vec![("Dal", 5)]);
    assert_eq!(store.count().unwrap(), 17);
}

/// In-memory store that serves pages in insertion order and can fail a
/// chosen delete call
struct ScriptedStore {
    records: Vec<ContentRecord>,
    delete_calls: Vec<usize>,
    fail_delete_call: Option<usize>,
}

impl ScriptedStore {
    fn with_duplicates(copies: usize) -> Self {
        let records = (0..copies)
            .map(|i| ContentRecord::new(format!("r{:04}", i), "Pie", "title", "Pie"))
            .collect();
        Self {
            records,
            delete_calls: Vec::new(),
            fail_delete_call: None,
        }
    }
}

impl ContentStore for ScriptedStore {
    fn count(&self) -> StoreResult<u64> {
        Ok(self.records.len() as u64)
    }

    fn get(&self, offset: usize, limit: usize) -> StoreResult<RecordPage> {
        let mut page = RecordPage::default();
        for record in self.records.iter().skip(offset).take(limit) {
            page.ids.push(record.id.clone());
            page.bodies.push(record.body.clone());
            page.metadatas.push(RecordMetadata {
                group_key: Some(record.group_key.clone()),
                kind: Some(record.kind.clone()),
                source_url: record.source_url.clone(),
            });
        }
        Ok(page)
    }

    fn delete(&mut self, ids: &[String]) -> StoreResult<()> {
        if self.fail_delete_call == Some(self.delete_calls.len() + 1) {
            return Err(StoreError::Backend("connection reset".to_string()));
        }
        self.delete_calls.push(ids.len());
        self.records.retain(|r| !ids.contains(&r.id));
        Ok(())
    }
}

#[test]
fn test_701_copies_delete_in_300_300_100() {
    let dir = TempDir::new().unwrap();
    let ledger = SeenLedger::new(dir.path().join("seen.json"));
    let mut store = ScriptedStore::with_duplicates(701);

    let report = ContentDeduper::default()
        .reconcile(&mut store, &ledger, |_: &ReconcileSummary| true)
        .unwrap();

    assert_eq!(store.delete_calls, vec![300, 300, 100]);
    assert_eq!(store.records.len(), 1);
    assert_eq!(store.records[0].id, "r0000");
    match report.outcome {
        ReconcileOutcome::Deleted { batches, .. } => assert_eq!(
            batches,
            vec![
                BatchOutcome { batch: 1, size: 300 },
                BatchOutcome { batch: 2, size: 300 },
                BatchOutcome { batch: 3, size: 100 },
            ]
        ),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_partial_failure_is_surfaced_and_ledger_untouched() {
    let dir = TempDir::new().unwrap();
    let ledger = SeenLedger::new(dir.path().join("seen.json"));
    let mut store = ScriptedStore::with_duplicates(701);
    store.fail_delete_call = Some(3);

    let err = ContentDeduper::default()
        .reconcile(&mut store, &ledger, |_: &ReconcileSummary| true)
        .unwrap_err();

    match err {
        DedupError::PartialDelete {
            failed_batch,
            total_batches,
            deleted,
            committed,
            remaining,
            ..
        } => {
            assert_eq!(failed_batch, 3);
            assert_eq!(total_batches, 3);
            assert_eq!(deleted, 600);
            assert_eq!(committed.len(), 2);
            assert_eq!(remaining.len(), 100);
        }
        other => panic!("unexpected error: {}", other),
    }

    assert_eq!(store.records.len(), 101);
    assert!(!ledger.path().exists());
}

#[test]
fn test_declined_leaves_store_and_ledger() {
    let dir = TempDir::new().unwrap();
    let ledger = SeenLedger::new(dir.path().join("seen.json"));
    let mut store = ScriptedStore::with_duplicates(3);

    let report = ContentDeduper::default()
        .reconcile(&mut store, &ledger, |_: &ReconcileSummary| false)
        .unwrap();

    assert_eq!(report.outcome, ReconcileOutcome::Declined);
    assert!(store.delete_calls.is_empty());
    assert_eq!(store.records.len(), 3);
    assert!(!ledger.path().exists());
}
