//! Cache Entry Module
//!
//! Pairs a cached record with its handle in the priority index.

use crate::cache::EntryHandle;

// == Cache Entry ==
/// A resident record and the handle of its recency node.
///
/// The recency itself lives in the priority index node the handle points
/// at, so the two can never disagree.
#[derive(Debug, Clone)]
pub struct CacheEntry<R> {
    /// The cached record
    pub record: R,
    /// Handle of this entry's node in the priority index
    pub handle: EntryHandle,
}

impl<R> CacheEntry<R> {
    // == Constructor ==
    pub fn new(record: R, handle: EntryHandle) -> Self {
        Self { record, handle }
    }

    // == Replace ==
    /// Swaps in a newer version of the record, keeping the handle.
    pub fn replace(&mut self, record: R) -> R {
        std::mem::replace(&mut self.record, record)
    }
}
