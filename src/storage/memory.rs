//! In-Memory Store
//!
//! A process-local [`RecordStore`] used for development and tests.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreResult;
use crate::storage::{Record, RecordStore};

#[derive(Debug)]
struct Inner<R> {
    records: HashMap<String, R>,
    /// Keys in save order, front = newest
    order: VecDeque<String>,
}

// == Memory Store ==
/// Keeps every saved record in a map, with recency given by save order.
#[derive(Debug)]
pub struct MemoryStore<R> {
    inner: RwLock<Inner<R>>,
}

impl<R: Record> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> MemoryStore<R> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                records: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Creates a store holding `records`, the last one being the newest.
    pub fn from_records(records: impl IntoIterator<Item = R>) -> Self {
        let mut inner = Inner {
            records: HashMap::new(),
            order: VecDeque::new(),
        };
        for record in records {
            inner.upsert(record);
        }
        Self {
            inner: RwLock::new(inner),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.records.is_empty()
    }
}

impl<R: Record> Inner<R> {
    fn upsert(&mut self, record: R) {
        let key = record.key().to_string();
        if self.records.insert(key.clone(), record).is_some() {
            self.order.retain(|k| k != &key);
        }
        self.order.push_front(key);
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for MemoryStore<R> {
    async fn get_by_key(&self, key: &str) -> StoreResult<Option<R>> {
        Ok(self.inner.read().await.records.get(key).cloned())
    }

    async fn get_most_recent(&self, n: usize) -> StoreResult<Vec<R>> {
        let inner = self.inner.read().await;
        Ok(inner
            .order
            .iter()
            .take(n)
            .filter_map(|key| inner.records.get(key).cloned())
            .collect())
    }

    async fn save(&self, record: &R) -> StoreResult<()> {
        self.inner.write().await.upsert(record.clone());
        Ok(())
    }
}
