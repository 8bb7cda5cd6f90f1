//! Least-recently-used store for document bytes
//!
//! Holds at most `capacity` documents keyed by their identifier. Recency is
//! tracked by the ordered list inside [`LruCache`], so lookups and inserts
//! stay O(1) and ties between equal timestamps resolve in access order.

use bytes::Bytes;
use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use tokio::time::Instant;
use tracing::debug;

/// Number of documents kept when no capacity is configured
pub const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(n) => n,
    None => panic!("default capacity must be non-zero"),
};

/// Cached bytes of one document plus bookkeeping
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Shared buffer; readers get cheap clones of the same allocation
    pub data: Bytes,

    /// Last time the entry was read or written
    pub last_access: Instant,

    /// Byte count recorded at insertion
    pub size: u64,
}

/// Read-only snapshot of the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub count: usize,
    pub capacity: usize,
    pub total_bytes: u64,
    /// Keys from least to most recently used
    pub keys: Vec<String>,
}

/// Fixed-capacity LRU map from document identifier to bytes
///
/// Every key also carries a write generation. Authoritative writes
/// (`set`, `delete`) bump it; `fill` only stores if the generation it was
/// handed is still current, so a read that started before a save cannot
/// overwrite the saved bytes when it settles.
pub struct DocumentCache {
    inner: Mutex<Inner>,
    capacity: NonZeroUsize,
}

struct Inner {
    entries: LruCache<String, CacheEntry>,
    /// Outlives evictions and `clear`
    generations: HashMap<String, u64>,
    next_generation: u64,
}

impl Inner {
    fn bump(&mut self, key: &str) {
        self.next_generation += 1;
        self.generations.insert(key.to_string(), self.next_generation);
    }

    fn generation(&self, key: &str) -> u64 {
        self.generations.get(key).copied().unwrap_or(0)
    }

    fn store(&mut self, key: &str, data: Bytes, size: u64, capacity: usize) {
        let entry = CacheEntry {
            data,
            last_access: Instant::now(),
            size,
        };

        if let Some((old_key, _)) = self.entries.push(key.to_string(), entry) {
            if old_key != key {
                debug!(key = %old_key, "Cache evicted (LRU policy)");
            }
        }

        debug!(key, count = self.entries.len(), capacity, "Cache stored");
    }
}

impl DocumentCache {
    /// Create a store holding at most `capacity` documents
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                generations: HashMap::new(),
                next_generation: 0,
            }),
            capacity,
        }
    }

    /// Create a store from a configured capacity, using the default for 0
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CAPACITY))
    }

    /// Get cached bytes, marking the entry most recently used
    pub fn get(&self, key: &str) -> Option<Bytes> {
        let mut inner = self.inner.lock();
        match inner.entries.get_mut(key) {
            Some(entry) => {
                entry.last_access = Instant::now();
                debug!(key, "Cache hit");
                Some(entry.data.clone())
            }
            None => {
                debug!(key, "Cache miss");
                None
            }
        }
    }

    /// Insert or replace an entry with freshly written bytes
    ///
    /// Replacing an existing key refreshes its recency and never evicts.
    /// Inserting a new key into a full store evicts the least recently used
    /// entry first.
    pub fn set(&self, key: &str, data: Bytes, size: u64) {
        let mut inner = self.inner.lock();
        inner.bump(key);
        inner.store(key, data, size, self.capacity.get());
    }

    /// Current write generation of `key`; pass it back to [`Self::fill`]
    pub fn generation(&self, key: &str) -> u64 {
        self.inner.lock().generation(key)
    }

    /// Store bytes read from the backing store unless `key` was written
    /// or deleted since `generation` was taken
    pub fn fill(&self, key: &str, data: Bytes, size: u64, generation: u64) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation(key) != generation {
            debug!(key, "Discarding stale read");
            return false;
        }
        inner.store(key, data, size, self.capacity.get());
        true
    }

    /// Check for a key without touching recency
    pub fn has(&self, key: &str) -> bool {
        self.inner.lock().entries.contains(key)
    }

    /// Remove one entry so the next read goes to the backing store
    pub fn delete(&self, key: &str) -> bool {
        let mut inner = self.inner.lock();
        inner.bump(key);
        let removed = inner.entries.pop(key).is_some();
        if removed {
            debug!(key, "Cache entry removed");
        }
        removed
    }

    /// Remove all entries
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        let count = inner.entries.len();
        inner.entries.clear();
        debug!(count, "Cache cleared");
    }

    /// Snapshot of the current contents
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            count: inner.entries.len(),
            capacity: self.capacity.get(),
            total_bytes: inner.entries.iter().map(|(_, e)| e.size).sum(),
            keys: inner.entries.iter().rev().map(|(k, _)| k.clone()).collect(),
        }
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }
}

impl Default for DocumentCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
