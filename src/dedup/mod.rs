//! Duplicate-content reconciliation
//!
//! [`ContentDeduper`] reads the whole record store, groups records whose
//! `(group_key, kind, body)` are identical, keeps the lowest id of each group
//! and deletes the rest in size-limited batches once the caller confirms.
//! Titles found along the way are merged into the [`SeenLedger`].

mod batch;
mod plan;

pub use batch::{delete_in_batches, BatchOutcome};
pub use plan::{content_hash, DedupPlan};

use crate::config::StoreConfig;
use crate::ledger::{record_titles, LedgerError, SeenLedger};
use crate::storage::{ContentRecord, ContentStore, StoreError, MAX_DELETE_BATCH};
use serde::Serialize;
use thiserror::Error;

/// Errors raised while reconciling
#[derive(Debug, Error)]
pub enum DedupError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error(
        "Delete batch {failed_batch}/{total_batches} failed after {deleted} ids were deleted: {source}"
    )]
    PartialDelete {
        failed_batch: usize,
        total_batches: usize,
        deleted: usize,
        committed: Vec<BatchOutcome>,
        remaining: Vec<String>,
        source: StoreError,
    },
}

/// Counts shown to the caller before anything is deleted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileSummary {
    pub total: usize,
    pub unique: usize,
    pub to_delete: usize,
    pub reduction_percent: f64,
}

impl From<&DedupPlan> for ReconcileSummary {
    fn from(plan: &DedupPlan) -> Self {
        Self {
            total: plan.total,
            unique: plan.unique(),
            to_delete: plan.duplicate_ids.len(),
            reduction_percent: plan.reduction_percent(),
        }
    }
}

/// Confirmation hook consulted before deletion
///
/// Any `FnMut(&ReconcileSummary) -> bool` closure is a `Confirm`.
pub trait Confirm {
    fn confirm(&mut self, summary: &ReconcileSummary) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&ReconcileSummary) -> bool,
{
    fn confirm(&mut self, summary: &ReconcileSummary) -> bool {
        self(summary)
    }
}

/// How a reconcile run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The store holds no records; nothing was asked or written
    EmptyStore,

    /// No duplicates; nothing was asked or deleted
    NothingToDelete,

    /// The caller declined; store and ledger untouched
    Declined,

    /// Every batch committed
    Deleted {
        batches: Vec<BatchOutcome>,
        count_before: u64,
        count_after: u64,
    },
}

/// Result of [`ContentDeduper::reconcile`]
#[derive(Debug, Clone)]
pub struct ReconcileReport {
    pub plan: DedupPlan,
    pub summary: ReconcileSummary,
    pub outcome: ReconcileOutcome,

    /// Titles newly added to the ledger
    pub titles_added: usize,

    /// Ledger size after the run
    pub ledger_size: usize,
}

impl ReconcileReport {
    /// Ids actually deleted
    pub fn deleted(&self) -> usize {
        match &self.outcome {
            ReconcileOutcome::Deleted { batches, .. } => batches.iter().map(|b| b.size).sum(),
            _ => 0,
        }
    }
}

/// Finds and removes duplicate records
#[derive(Debug, Clone)]
pub struct ContentDeduper {
    read_page_size: usize,
    delete_batch_size: usize,
}

impl Default for ContentDeduper {
    fn default() -> Self {
        Self::new(300, MAX_DELETE_BATCH)
    }
}

impl ContentDeduper {
    pub fn new(read_page_size: usize, delete_batch_size: usize) -> Self {
        Self {
            read_page_size: read_page_size.max(1),
            delete_batch_size: delete_batch_size.max(1),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.read_page_size, config.delete_batch_size)
    }

    /// Reads every record, one page at a time
    ///
    /// Stops at the first empty or short page.
    pub fn read_all<S>(&self, store: &S) -> Result<Vec<ContentRecord>, DedupError>
    where
        S: ContentStore + ?Sized,
    {
        let mut records = Vec::new();
        let mut offset = 0;

        loop {
            let page = store.get(offset, self.read_page_size)?;
            let len = page.len();
            if len == 0 {
                break;
            }

            records.extend(page.into_records());
            offset += len;
            tracing::debug!("Read {} records so far", records.len());

            if len < self.read_page_size {
                break;
            }
        }

        Ok(records)
    }

    /// Read-only duplicate analysis
    pub fn inspect<S>(&self, store: &S) -> Result<DedupPlan, DedupError>
    where
        S: ContentStore + ?Sized,
    {
        let plan = DedupPlan::build(self.read_all(store)?);
        tracing::info!(
            "Analysed {} records: {} unique, {} duplicates ({:.1}%)",
            plan.total,
            plan.unique(),
            plan.duplicate_ids.len(),
            plan.reduction_percent()
        );
        Ok(plan)
    }

    /// Removes duplicate records and records their titles as seen
    ///
    /// # Arguments
    ///
    /// * `store` - The record store to read and prune
    /// * `ledger` - The seen ledger that receives every title group key
    /// * `confirm` - Asked once, with the counts, before anything is deleted
    ///
    /// # Returns
    ///
    /// * `Ok(ReconcileReport)` - The plan, the counts shown to `confirm` and
    ///   how the run ended
    /// * `Err(DedupError)` - A read failed, the ledger could not be saved, or
    ///   a delete batch failed (`PartialDelete`)
    ///
    /// # Flow
    ///
    /// | Situation | Store | Ledger |
    /// |-----------|-------|--------|
    /// | empty store | untouched, `confirm` not called | untouched |
    /// | no duplicates | untouched, `confirm` not called | titles merged, saved |
    /// | `confirm` returns false | untouched | untouched |
    /// | all batches commit | duplicates deleted | titles merged, saved once |
    /// | a batch fails | earlier batches stay deleted | untouched, error returned |
    pub fn reconcile<S, C>(
        &self,
        store: &mut S,
        ledger: &SeenLedger,
        mut confirm: C,
    ) -> Result<ReconcileReport, DedupError>
    where
        S: ContentStore + ?Sized,
        C: Confirm,
    {
        let plan = self.inspect(store)?;
        let summary = ReconcileSummary::from(&plan);

        if plan.total == 0 {
            tracing::info!("Record store is empty, nothing to reconcile");
            return Ok(ReconcileReport {
                plan,
                summary,
                outcome: ReconcileOutcome::EmptyStore,
                titles_added: 0,
                ledger_size: ledger.load().len(),
            });
        }

        let outcome = if !plan.has_duplicates() {
            tracing::info!("No duplicates found");
            ReconcileOutcome::NothingToDelete
        } else if !confirm.confirm(&summary) {
            tracing::info!("Deletion declined, no changes made");
            return Ok(ReconcileReport {
                plan,
                summary,
                outcome: ReconcileOutcome::Declined,
                titles_added: 0,
                ledger_size: ledger.load().len(),
            });
        } else {
            let count_before = store.count()?;
            let batches = delete_in_batches(store, &plan.duplicate_ids, self.delete_batch_size)?;
            let count_after = store.count()?;
            tracing::info!(
                "Removed {} records ({} -> {})",
                count_before.saturating_sub(count_after),
                count_before,
                count_after
            );
            ReconcileOutcome::Deleted {
                batches,
                count_before,
                count_after,
            }
        };

        let mut seen = ledger.load();
        let titles_added = record_titles(&mut seen, plan.titles.iter().cloned());
        ledger.save(&seen)?;

        Ok(ReconcileReport {
            plan,
            summary,
            outcome,
            titles_added,
            ledger_size: seen.len(),
        })
    }
}
