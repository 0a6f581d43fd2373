//! Size-limited batch deletion

use crate::dedup::DedupError;
use crate::storage::ContentStore;
use serde::Serialize;

/// One committed delete call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    /// 1-based position in the batch sequence
    pub batch: usize,
    /// Ids removed by this call
    pub size: usize,
}

/// Deletes `ids` in consecutive chunks of at most `batch_size`
///
/// # Arguments
///
/// * `store` - The store to delete from
/// * `ids` - Ids to delete, in the order batches should be issued
/// * `batch_size` - Requested chunk size; capped by
///   [`ContentStore::max_delete_batch`]
///
/// # Returns
///
/// * `Ok(Vec<BatchOutcome>)` - One entry per committed batch
/// * `Err(DedupError::PartialDelete)` - Batches run in order and stop at
///   the first failure; the error lists the committed batches and every id
///   not yet deleted
pub fn delete_in_batches<S>(
    store: &mut S,
    ids: &[String],
    batch_size: usize,
) -> Result<Vec<BatchOutcome>, DedupError>
where
    S: ContentStore + ?Sized,
{
    let size = batch_size.min(store.max_delete_batch()).max(1);
    let total_batches = ids.len().div_ceil(size);
    let mut committed = Vec::with_capacity(total_batches);

    for (index, chunk) in ids.chunks(size).enumerate() {
        let batch = index + 1;
        match store.delete(chunk) {
            Ok(()) => {
                tracing::info!(
                    "Deleted batch {}/{} ({} ids)",
                    batch,
                    total_batches,
                    chunk.len()
                );
                committed.push(BatchOutcome {
                    batch,
                    size: chunk.len(),
                });
            }
            Err(source) => {
                let deleted: usize = committed.iter().map(|b| b.size).sum();
                tracing::error!(
                    "Delete batch {}/{} failed after {} ids were deleted: {}",
                    batch,
                    total_batches,
                    deleted,
                    source
                );
                return Err(DedupError::PartialDelete {
                    failed_batch: batch,
                    total_batches,
                    deleted,
                    committed,
                    remaining: ids[index * size..].to_vec(),
                    source,
                });
            }
        }
    }

    Ok(committed)
}
