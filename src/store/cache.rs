use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use super::RecordStore;
use crate::error::Result;
use crate::record::Record;

/// Thread-safe LRU cache in front of another record store
///
/// Most records in a corpus share a handful of parents, so caching successful
/// fetches avoids re-reading and re-decoding the same files. Failed fetches are
/// not cached.
pub struct CachingStore<S> {
    inner: S,
    cache: Mutex<LruCache<i64, Record>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<S: RecordStore> CachingStore<S> {
    /// Create a new caching store holding at most `capacity` records
    ///
    /// A capacity of 0 is treated as 1.
    pub fn new(inner: S, capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);

        Self {
            inner,
            cache: Mutex::new(LruCache::new(cap)),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Get the current number of cached records
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// (hits, misses) since creation
    pub fn stats(&self) -> (usize, usize) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<i64, Record>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: RecordStore> RecordStore for CachingStore<S> {
    fn fetch(&self, id: i64) -> Result<Record> {
        if let Some(record) = self.lock().get(&id).cloned() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(record);
        }

        // Lock is not held across the inner fetch; two workers may race to
        // load the same record, which is harmless.
        self.misses.fetch_add(1, Ordering::Relaxed);
        let record = self.inner.fetch(id)?;
        self.lock().put(id, record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn record(id: i64) -> Record {
        Record {
            id,
            name: format!("place {}", id),
            ..Record::default()
        }
    }

    fn store_with(ids: &[i64]) -> MemoryStore {
        ids.iter().map(|&id| record(id)).collect()
    }

    #[test]
    fn test_cache_hit_after_miss() {
        let store = CachingStore::new(store_with(&[1, 2]), 10);

        assert_eq!(store.fetch(1).unwrap().id, 1);
        assert_eq!(store.fetch(1).unwrap().id, 1);
        assert_eq!(store.stats(), (1, 1));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_cache_does_not_store_failures() {
        let store = CachingStore::new(store_with(&[]), 10);

        assert!(store.fetch(99).is_err());
        assert!(store.is_empty());
        assert_eq!(store.stats(), (0, 1));
    }

    #[test]
    fn test_cache_eviction() {
        let store = CachingStore::new(store_with(&[1, 2, 3]), 2);

        store.fetch(1).unwrap();
        store.fetch(2).unwrap();
        store.fetch(3).unwrap(); // evicts 1
        assert_eq!(store.len(), 2);

        store.fetch(1).unwrap();
        assert_eq!(store.stats(), (0, 4));
    }

    #[test]
    fn test_cache_capacity_zero_is_one() {
        let store = CachingStore::new(store_with(&[1, 2]), 0);

        store.fetch(1).unwrap();
        store.fetch(2).unwrap();
        assert_eq!(store.len(), 1);
    }
}
