//! Content hashing and survivor selection

use crate::storage::ContentRecord;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Hash of a record's semantic identity
///
/// Each of `group_key`, `kind` and `body` is length-prefixed before hashing
/// so that shifting text between fields never produces the same digest.
/// The record id and source URL are not part of the hash.
pub fn content_hash(record: &ContentRecord) -> String {
    let mut hasher = Sha256::new();
    for field in [&record.group_key, &record.kind, &record.body] {
        hasher.update((field.len() as u64).to_le_bytes());
        hasher.update(field.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Result of grouping a full read of the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupPlan {
    /// Records analysed
    pub total: usize,

    /// First id of every content group, ascending
    pub survivor_ids: Vec<String>,

    /// Every other id, ascending
    pub duplicate_ids: Vec<String>,

    /// Records per group key, duplicates included
    pub group_counts: BTreeMap<String, usize>,

    /// Group keys of all title records
    pub titles: BTreeSet<String>,

    /// Distinct non-empty source URLs
    pub source_urls: usize,
}

impl DedupPlan {
    /// Groups `records` by content and picks one survivor per group
    ///
    /// Records are stable-sorted by id first, so the lowest id of each group
    /// survives no matter what order the store returned them in.
    pub fn build(mut records: Vec<ContentRecord>) -> Self {
        records.sort_by(|a, b| a.id.cmp(&b.id));

        let mut plan = DedupPlan {
            total: records.len(),
            ..Default::default()
        };
        let mut hashes = HashSet::new();
        let mut urls = HashSet::new();

        for record in records {
            *plan.group_counts.entry(record.group_key.clone()).or_insert(0) += 1;

            if record.is_title() {
                plan.titles.insert(record.group_key.clone());
            }

            if let Some(url) = record.source_url.as_deref().filter(|u| !u.is_empty()) {
                urls.insert(url.to_string());
            }

            if hashes.insert(content_hash(&record)) {
                plan.survivor_ids.push(record.id);
            } else {
                plan.duplicate_ids.push(record.id);
            }
        }

        plan.source_urls = urls.len();
        plan
    }

    /// Number of distinct content groups
    pub fn unique(&self) -> usize {
        self.survivor_ids.len()
    }

    pub fn has_duplicates(&self) -> bool {
        !self.duplicate_ids.is_empty()
    }

    /// Share of records that are duplicates, in percent
    pub fn reduction_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.duplicate_ids.len() as f64 / self.total as f64 * 100.0
        }
    }

    /// The `n` group keys with the most records, largest first
    ///
    /// Ties are broken by group key.
    pub fn top_groups(&self, n: usize) -> Vec<(&str, usize)> {
        let mut groups: Vec<(&str, usize)> = self
            .group_counts
            .iter()
            .map(|(key, count)| (key.as_str(), *count))
            .collect();
        groups.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        groups.truncate(n);
        groups
    }
}
