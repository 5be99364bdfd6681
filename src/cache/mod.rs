//! Cache Module
//!
//! Bounded in-memory cache with LRU eviction driven by an indexed min-heap.

mod entry;
mod index;
mod lru_cache;
mod recency;
mod stats;


// Re-export public types
pub use entry::CacheEntry;
pub use index::{EntryHandle, IndexError, PriorityIndex};
pub use lru_cache::RecordCache;
pub use recency::{Recency, RecencyClock};
pub use stats::CacheStats;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
