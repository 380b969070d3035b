//! Two-level path sampling cache.
//!
//! Level one is a per-frame memo, cleared by [`PathSamplingCache::begin_frame`], so that a fill
//! and a stroke of the same path sample it once per frame. Level two is a bounded cross-frame LRU
//! that serves scrubbing and looping playback.

use crate::foundation::quantize::quantize_frame;
use crate::geometry::path::BezierPath;
use crate::paths::registry::PathId;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

const DEFAULT_CAPACITY: usize = 256;

/// Options for [`PathSamplingCache`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathCacheOpts {
    /// Maximum entries kept by the cross-frame LRU.
    pub capacity: usize,
}

impl Default for PathCacheOpts {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl PathCacheOpts {
    /// Defaults, with the capacity overridable via `ANIMIR_PATH_CACHE_CAPACITY`.
    pub fn from_env() -> Self {
        let capacity = std::env::var("ANIMIR_PATH_CACHE_CAPACITY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_CAPACITY);
        Self { capacity }
    }
}

/// Cache key: registry generation, path id and quantized frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SampleKey {
    /// Registry generation id.
    pub generation_id: u64,
    /// Path id within the registry.
    pub path_id: PathId,
    /// Frame on the cache grid.
    pub frame_key: i64,
}

/// Hit/miss counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Served from the frame memo.
    pub memo_hits: u64,
    /// Served from the LRU.
    pub lru_hits: u64,
    /// Producer invocations.
    pub misses: u64,
    /// Entries evicted from the LRU.
    pub evictions: u64,
}

/// Path sampling cache. Confined to one rendering thread.
#[derive(Debug)]
pub struct PathSamplingCache {
    memo: HashMap<SampleKey, Arc<BezierPath>>,
    lru_entries: HashMap<SampleKey, Arc<BezierPath>>,
    lru: VecDeque<SampleKey>,
    capacity: usize,
    stats: CacheStats,
}

impl Default for PathSamplingCache {
    fn default() -> Self {
        Self::new(PathCacheOpts::from_env())
    }
}

impl PathSamplingCache {
    /// Create an empty cache.
    pub fn new(opts: PathCacheOpts) -> Self {
        Self {
            memo: HashMap::new(),
            lru_entries: HashMap::new(),
            lru: VecDeque::new(),
            capacity: opts.capacity.max(1),
            stats: CacheStats::default(),
        }
    }

    /// LRU capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Counters since creation.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Entries currently held by the LRU.
    pub fn lru_len(&self) -> usize {
        self.lru.len()
    }

    /// Start a new frame: clears the frame memo, keeps the LRU.
    pub fn begin_frame(&mut self) {
        self.memo.clear();
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.memo.clear();
        self.lru_entries.clear();
        self.lru.clear();
    }

    /// Sample `path_id` at `frame`, invoking `producer` only on a miss.
    ///
    /// A `None` producer result is returned as-is and never cached.
    pub fn sample<F>(
        &mut self,
        generation_id: u64,
        path_id: PathId,
        frame: f64,
        producer: F,
    ) -> Option<Arc<BezierPath>>
    where
        F: FnOnce() -> Option<BezierPath>,
    {
        let key = SampleKey {
            generation_id,
            path_id,
            frame_key: quantize_frame(frame),
        };

        if let Some(p) = self.memo.get(&key) {
            self.stats.memo_hits += 1;
            return Some(Arc::clone(p));
        }
        if let Some(p) = self.lru_entries.get(&key).cloned() {
            self.stats.lru_hits += 1;
            self.touch(key);
            self.memo.insert(key, Arc::clone(&p));
            return Some(p);
        }

        self.stats.misses += 1;
        let path = Arc::new(producer()?);
        self.memo.insert(key, Arc::clone(&path));
        self.insert_lru(key, Arc::clone(&path));
        Some(path)
    }

    fn insert_lru(&mut self, key: SampleKey, path: Arc<BezierPath>) {
        self.lru_entries.insert(key, path);
        self.touch(key);
        while self.lru.len() > self.capacity {
            if let Some(old) = self.lru.pop_front() {
                self.lru_entries.remove(&old);
                self.stats.evictions += 1;
            }
        }
    }

    fn touch(&mut self, key: SampleKey) {
        if let Some(pos) = self.lru.iter().position(|k| *k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paths/cache.rs"]
mod tests;
