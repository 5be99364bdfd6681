//! Record Cache Module
//!
//! Read-through, write-through LRU cache in front of a [`RecordStore`].

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, warn};

use crate::cache::{CacheEntry, CacheStats, PriorityIndex, RecencyClock};
use crate::error::{CacheError, Result};
use crate::storage::{Record, RecordStore};

/// Number of per-key lock stripes; keys hashing to one stripe share a lock.
const KEY_LOCK_STRIPES: usize = 64;

/// In-memory half of the cache, always mutated as one unit.
#[derive(Debug)]
struct CacheState<R> {
    entries: HashMap<String, CacheEntry<R>>,
    index: PriorityIndex<String>,
    clock: RecencyClock,
    stats: CacheStats,
}

// == Record Cache ==
/// Bounded cache of records with least-recently-used eviction.
///
/// Store calls never run under the state lock, so a slow store round-trip
/// does not block concurrent hits. Store traffic for one key is ordered by
/// a striped key lock instead: miss-fills share it, saves hold it
/// exclusively from the store write until the record is cached.
pub struct RecordCache<R: Record> {
    store: Arc<dyn RecordStore<R>>,
    state: Mutex<CacheState<R>>,
    key_locks: Vec<RwLock<()>>,
    capacity: usize,
}

impl<R: Record> RecordCache<R> {
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` records.
    ///
    /// A capacity of zero is legal: nothing is retained and every read goes
    /// to the store.
    pub fn new(store: Arc<dyn RecordStore<R>>, capacity: usize) -> Self {
        Self {
            store,
            state: Mutex::new(CacheState {
                entries: HashMap::with_capacity(capacity),
                index: PriorityIndex::with_capacity(capacity),
                clock: RecencyClock::new(),
                stats: CacheStats::new(),
            }),
            key_locks: (0..KEY_LOCK_STRIPES).map(|_| RwLock::new(())).collect(),
            capacity,
        }
    }

    // == Get ==
    /// Returns the record for `key`, reading through to the store on a miss.
    ///
    /// A hit refreshes the entry's recency. A miss that the store answers is
    /// cached, evicting the least recently used entry if needed.
    pub async fn get(&self, key: &str) -> Result<R> {
        {
            let mut state = self.state.lock().await;
            if let Some(record) = state.touch(key)? {
                state.stats.record_hit();
                debug!(key, "cache hit");
                return Ok(record);
            }
            state.stats.record_miss();
        }

        // A save of this key cannot land between the lookup and the fill
        let _fill = self.key_lock(key).read().await;

        debug!(key, "cache miss, querying store");
        let record = match self.store.get_by_key(key).await {
            Ok(Some(record)) => record,
            Ok(None) => return Err(CacheError::NotFound(key.to_string())),
            Err(e) => {
                warn!(key, error = %e, "store lookup failed");
                return Err(CacheError::Store(e));
            }
        };

        let mut state = self.state.lock().await;
        // Another caller may have filled or saved this key meanwhile
        if let Some(existing) = state.touch(key)? {
            return Ok(existing);
        }
        state.upsert(record.clone(), self.capacity)?;
        Ok(record)
    }

    // == Save ==
    /// Persists `record` to the store, then caches it.
    ///
    /// If the store rejects the write the cache is left unchanged. Saves of
    /// the same key reach the store and the cache in the same order.
    pub async fn save(&self, record: R) -> Result<()> {
        let _write = self.key_lock(record.key()).write().await;
        self.store.save(&record).await?;

        let mut state = self.state.lock().await;
        state.upsert(record, self.capacity)
    }

    // == Warm Up ==
    /// Seeds the cache with the `n` most recent records from the store.
    ///
    /// Records are inserted oldest first so the newest one ends up most
    /// recently used. A store failure aborts before anything is inserted.
    /// Returns the number of entries resident afterwards.
    pub async fn warm_up(&self, n: usize) -> Result<usize> {
        let records = self
            .store
            .get_most_recent(n)
            .await
            .map_err(CacheError::WarmUp)?;

        let mut state = self.state.lock().await;
        for record in records.into_iter().rev() {
            state.upsert(record, self.capacity)?;
        }
        Ok(state.entries.len())
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        stats
    }

    /// Checks residency without touching recency.
    pub async fn contains(&self, key: &str) -> bool {
        self.state.lock().await.entries.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn key_lock(&self, key: &str) -> &RwLock<()> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let stripe = (hasher.finish() % self.key_locks.len() as u64) as usize;
        &self.key_locks[stripe]
    }

    /// Asserts map/index bijection, capacity and heap ordering.
    #[cfg(test)]
    pub(crate) async fn assert_invariants(&self) {
        let state = self.state.lock().await;

        let mut map_keys: Vec<String> = state.entries.keys().cloned().collect();
        let mut index_keys = state.index.keys();
        map_keys.sort();
        index_keys.sort();
        assert_eq!(map_keys, index_keys, "map and index keys diverged");
        assert!(state.entries.len() <= self.capacity);

        for (key, entry) in &state.entries {
            assert_eq!(state.index.handle_of(key), Some(entry.handle));
        }
        state.index.assert_consistent();
    }
}

impl<R: Record> CacheState<R> {
    /// Bumps the recency of a resident key and returns its record.
    fn touch(&mut self, key: &str) -> Result<Option<R>> {
        let Some(entry) = self.entries.get(key) else {
            return Ok(None);
        };
        let recency = self.clock.tick();
        if !self.index.update_recency(entry.handle, recency) {
            return Err(stale_handle(key));
        }
        Ok(Some(entry.record.clone()))
    }

    /// Inserts or replaces `record`, then evicts down to `capacity`.
    fn upsert(&mut self, record: R, capacity: usize) -> Result<()> {
        let recency = self.clock.tick();

        if let Some(entry) = self.entries.get_mut(record.key()) {
            if !self.index.update_recency(entry.handle, recency) {
                return Err(stale_handle(record.key()));
            }
            entry.replace(record);
            return Ok(());
        }

        let key = record.key().to_string();
        let handle = self
            .index
            .insert(key.clone(), recency)
            .map_err(|e| CacheError::Internal(e.to_string()))?;
        self.entries.insert(key, CacheEntry::new(record, handle));
        self.evict_overflow(capacity);
        Ok(())
    }

    fn evict_overflow(&mut self, capacity: usize) {
        while self.entries.len() > capacity {
            let Some((key, _)) = self.index.extract_min() else {
                break;
            };
            self.entries.remove(&key);
            self.stats.record_eviction();
            debug!(key = %key, "evicted least recently used entry");
        }
    }
}

/// A resident entry whose handle the index no longer knows.
fn stale_handle(key: &str) -> CacheError {
    error!(key, "cache map and priority index disagree");
    CacheError::Internal(format!("stale index handle for key {}", key))
}
