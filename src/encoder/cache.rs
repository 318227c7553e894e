use std::num::NonZeroUsize;

use lru::LruCache;

use crate::encoder::sparse::SparseVector;

/// Capacity-bounded store of input vectors keyed by raw text.
pub trait TextCache {
    fn with_capacity(capacity: NonZeroUsize) -> Self
    where
        Self: Sized;
    fn get(&mut self, text: &str) -> Option<SparseVector>;
    fn put(&mut self, text: String, vector: SparseVector);
    /// 全エントリを破棄する
    fn clear(&mut self);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// LRU eviction backed by `lru::LruCache`.
#[derive(Debug)]
pub struct LruTextCache {
    inner: LruCache<String, SparseVector>,
}

impl LruTextCache {
    pub fn capacity(&self) -> usize {
        self.inner.cap().get()
    }
}

impl TextCache for LruTextCache {
    fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            inner: LruCache::new(capacity),
        }
    }

    #[inline]
    fn get(&mut self, text: &str) -> Option<SparseVector> {
        self.inner.get(text).cloned()
    }

    #[inline]
    fn put(&mut self, text: String, vector: SparseVector) {
        self.inner.put(text, vector);
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// Hit / miss / invalidation counters of an encoder's cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// clears caused by a new feature entering the vocabulary
    pub invalidations: u64,
}
