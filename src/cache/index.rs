//! Priority Index Module
//!
//! Indexed binary min-heap ordering keys by recency for LRU eviction.
//!
//! Every node remembers the slot of its handle, and the slot remembers the
//! node's current heap position. Each swap during sift-up/sift-down rewrites
//! both positions, so a handle always resolves to its node in O(1) and a
//! recency update costs O(log n).

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::cache::Recency;

// == Index Error ==
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Key is already tracked; callers must update it instead
    #[error("Key already indexed: {0}")]
    DuplicateKey(String),
}

// == Entry Handle ==
/// Stable reference to an entry inside a [`PriorityIndex`].
///
/// Remains valid while the entry is present, however the heap reorders.
/// Once the entry is extracted the handle goes stale; the slot generation
/// keeps a reused slot from being mistaken for the old entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle {
    slot: usize,
    generation: u32,
}

#[derive(Debug)]
struct Node<K> {
    key: K,
    recency: Recency,
    slot: usize,
}

#[derive(Debug, Default)]
struct Slot {
    /// Current position in the heap, None while the slot is free
    position: Option<usize>,
    generation: u32,
}

#[derive(Debug)]
struct Heap<K> {
    nodes: Vec<Node<K>>,
    slots: Vec<Slot>,
    free: Vec<usize>,
    by_key: HashMap<K, EntryHandle>,
}

// == Priority Index ==
/// Thread-safe min-heap of keys ordered by ascending recency.
///
/// The root is always the least recently touched key. All operations take
/// the internal lock; sequences of calls are not atomic with each other.
#[derive(Debug)]
pub struct PriorityIndex<K> {
    inner: Mutex<Heap<K>>,
}

impl<K> Default for PriorityIndex<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> PriorityIndex<K>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty index with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Heap {
                nodes: Vec::with_capacity(capacity),
                slots: Vec::with_capacity(capacity),
                free: Vec::new(),
                by_key: HashMap::with_capacity(capacity),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Heap<K>> {
        // Every mutation completes before the guard drops, so a poisoned
        // lock still guards a consistent heap.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // == Insert ==
    /// Adds `key` with the given recency and returns its handle.
    ///
    /// Fails if the key is already present.
    pub fn insert(&self, key: K, recency: Recency) -> Result<EntryHandle, IndexError>
    where
        K: std::fmt::Debug,
    {
        let mut heap = self.lock();
        if heap.by_key.contains_key(&key) {
            return Err(IndexError::DuplicateKey(format!("{:?}", key)));
        }

        let slot = match heap.free.pop() {
            Some(slot) => slot,
            None => {
                heap.slots.push(Slot::default());
                heap.slots.len() - 1
            }
        };
        let position = heap.nodes.len();
        heap.slots[slot].position = Some(position);
        let handle = EntryHandle {
            slot,
            generation: heap.slots[slot].generation,
        };

        heap.nodes.push(Node {
            key: key.clone(),
            recency,
            slot,
        });
        heap.by_key.insert(key, handle);
        heap.sift_up(position);

        Ok(handle)
    }

    // == Extract Min ==
    /// Removes and returns the least recently touched entry.
    pub fn extract_min(&self) -> Option<(K, Recency)> {
        let mut heap = self.lock();
        if heap.nodes.is_empty() {
            return None;
        }

        let last = heap.nodes.len() - 1;
        heap.swap_nodes(0, last);
        let node = heap.nodes.pop()?;

        let slot = &mut heap.slots[node.slot];
        slot.position = None;
        slot.generation = slot.generation.wrapping_add(1);
        heap.free.push(node.slot);
        heap.by_key.remove(&node.key);

        if !heap.nodes.is_empty() {
            heap.sift_down(0);
        }

        Some((node.key, node.recency))
    }

    // == Update Recency ==
    /// Moves the entry behind `handle` to its place for `recency`.
    ///
    /// Returns false, leaving the index unchanged, if the handle is stale.
    pub fn update_recency(&self, handle: EntryHandle, recency: Recency) -> bool {
        let mut heap = self.lock();
        let Some(position) = heap.position_of(handle) else {
            return false;
        };

        let previous = std::mem::replace(&mut heap.nodes[position].recency, recency);
        if recency < previous {
            heap.sift_up(position);
        } else {
            heap.sift_down(position);
        }
        true
    }

    // == Peek Min ==
    /// Returns the least recently touched entry without removing it.
    #[allow(dead_code)]
    pub fn peek_min(&self) -> Option<(K, Recency)> {
        let heap = self.lock();
        heap.nodes
            .first()
            .map(|node| (node.key.clone(), node.recency))
    }

    /// Returns the recency currently recorded for `handle`.
    #[allow(dead_code)]
    pub fn recency_of(&self, handle: EntryHandle) -> Option<Recency> {
        let heap = self.lock();
        heap.position_of(handle)
            .map(|position| heap.nodes[position].recency)
    }

    /// Returns the handle for `key`, if present.
    pub fn handle_of(&self, key: &K) -> Option<EntryHandle> {
        self.lock().by_key.get(key).copied()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.lock().by_key.contains_key(key)
    }

    /// Snapshot of every key currently indexed, in heap order.
    pub fn keys(&self) -> Vec<K> {
        self.lock().nodes.iter().map(|node| node.key.clone()).collect()
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.lock().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().nodes.is_empty()
    }

    /// Checks the heap property and every position back-reference.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let heap = self.lock();
        assert_eq!(heap.nodes.len(), heap.by_key.len());
        for (position, node) in heap.nodes.iter().enumerate() {
            assert_eq!(heap.slots[node.slot].position, Some(position));
            if position > 0 {
                let parent = (position - 1) / 2;
                assert!(heap.nodes[parent].recency <= node.recency);
            }
            let handle = heap.by_key[&node.key];
            assert_eq!(handle.slot, node.slot);
        }
    }
}

impl<K> Heap<K> {
    fn position_of(&self, handle: EntryHandle) -> Option<usize> {
        let slot = self.slots.get(handle.slot)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.position
    }

    /// Swaps two nodes and rewrites both back-references.
    fn swap_nodes(&mut self, a: usize, b: usize) {
        self.nodes.swap(a, b);
        let slot_a = self.nodes[a].slot;
        let slot_b = self.nodes[b].slot;
        self.slots[slot_a].position = Some(a);
        self.slots[slot_b].position = Some(b);
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if self.nodes[idx].recency < self.nodes[parent].recency {
                self.swap_nodes(idx, parent);
                idx = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.nodes.len();
        loop {
            let left = 2 * idx + 1;
            let right = 2 * idx + 2;
            let mut smallest = idx;

            if left < len && self.nodes[left].recency < self.nodes[smallest].recency {
                smallest = left;
            }
            if right < len && self.nodes[right].recency < self.nodes[smallest].recency {
                smallest = right;
            }

            if smallest == idx {
                break;
            }
            self.swap_nodes(idx, smallest);
            idx = smallest;
        }
    }
}
