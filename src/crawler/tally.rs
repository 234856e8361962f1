use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

/// Shared running total of word occurrences across all processed pages
///
/// Merges from different crawl branches interleave freely: each word's
/// total is updated under that word's own entry lock, so merges touching
/// disjoint words do not serialize against each other, while concurrent
/// merges of the same word never lose an update. Merge order does not
/// affect the final totals.
///
/// Cloning a tally clones the handle, not the contents.
#[derive(Debug, Clone, Default)]
pub struct WordTally {
    counts: Arc<DashMap<String, u64>>,
}

impl WordTally {
    /// Create an empty tally for a new crawl
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one page's word counts into the running totals
    pub fn merge(&self, page_counts: HashMap<String, u64>) {
        for (word, count) in page_counts {
            *self.counts.entry(word).or_insert(0) += count;
        }
    }

    /// Snapshot the current totals into an owned map
    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    /// Number of distinct words counted so far
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True if nothing has been counted yet
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
