//! Storage Module
//!
//! The durable store the cache reads through to and writes through to.

mod memory;

use async_trait::async_trait;

use crate::error::StoreResult;

pub use memory::MemoryStore;

// == Record ==
/// A value addressed by a unique string key.
pub trait Record: Clone + Send + Sync + 'static {
    /// The unique key of this record.
    fn key(&self) -> &str;
}

// == Record Store ==
/// Durable storage consulted on cache miss and written on every save.
///
/// Every call may block on I/O. Timeouts and retries belong to the
/// implementation and surface as ordinary [`StoreError`](crate::error::StoreError)s.
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    /// Fetches a record by key, `Ok(None)` when the store has no such record.
    async fn get_by_key(&self, key: &str) -> StoreResult<Option<R>>;

    /// Returns up to `n` of the most recently saved records, newest first.
    async fn get_most_recent(&self, n: usize) -> StoreResult<Vec<R>>;

    /// Durably saves a record, replacing any previous version.
    async fn save(&self, record: &R) -> StoreResult<()>;
}
