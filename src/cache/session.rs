//! Bounded LRU session cache with single-flight loading.
//!
//! # Locking
//!
//! Two kinds of lock are involved, and only one of them may be held across
//! I/O:
//!
//! - the cache-wide `std::sync::Mutex` around the [`LruCache`], held only
//!   for a lookup, promote, insert or evict, never across an `.await`;
//! - a per-key async load lock from [`LockRegistry`], held for the whole
//!   upstream load so concurrent misses for the same key queue behind it.
//!
//! # Load path
//!
//! A miss takes the key's load lock, re-checks the cache (another caller may
//! have finished the load while we waited), and only then calls the loader
//! through the shared [`TimeoutExecutor`]. The result is inserted first
//! writer wins, evicting least-recently-used entries past capacity.
//!
//! Failures are not cached. The caller that ran the load gets the error; the
//! callers queued behind it find the cache still empty and run their own
//! load, one at a time.

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lru::LruCache;
use tracing::{debug, trace};

use super::lock::LockRegistry;
use crate::executor::TimeoutExecutor;
use crate::telemetry;
use crate::types::{CacheKey, Session};
use crate::Result;

/// Default number of sessions kept in memory.
///
/// Loaded sessions carry full lap and telemetry tables, so this is small.
pub const DEFAULT_SESSION_CAPACITY: usize = 6;

/// LRU cache of loaded sessions keyed by (year, round).
pub struct SessionCache<V = Session> {
    entries: Mutex<LruCache<CacheKey, Arc<V>>>,
    locks: LockRegistry<CacheKey>,
    executor: Arc<TimeoutExecutor>,
}

impl<V: Send + Sync + 'static> SessionCache<V> {
    /// Create a cache holding at most `capacity` sessions (minimum one).
    pub fn new(capacity: usize, executor: Arc<TimeoutExecutor>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            locks: LockRegistry::new(),
            executor,
        }
    }

    /// Return the cached session for `key`, loading it on a miss.
    ///
    /// At most one `loader` runs per key at any time. Concurrent callers
    /// for the same key wait for that load and share its result. The load
    /// is bounded by the executor's deadline; on timeout this caller gets
    /// [`PaddockError::Timeout`](crate::PaddockError::Timeout) and the
    /// loader keeps running detached.
    pub async fn get_or_load<F, Fut>(&self, key: impl Into<CacheKey>, loader: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let key = key.into();
        if let Some(hit) = self.lookup(&key) {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "cache" => "session").increment(1);
            trace!(%key, "session cache hit");
            return Ok(hit);
        }
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "cache" => "session").increment(1);

        // Declared before the guard so the guard is released first and the
        // handle can retire an unheld lock.
        let load_lock = self.locks.acquire(&key);
        let _guard = load_lock.lock().await;

        if let Some(hit) = self.lookup(&key) {
            metrics::counter!(telemetry::COALESCED_TOTAL, "cache" => "session").increment(1);
            debug!(%key, "session loaded by another caller while waiting");
            return Ok(hit);
        }

        debug!(%key, "session cache miss, loading from upstream");
        let loaded = self.executor.run(loader()).await;
        let status = if loaded.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::LOADS_TOTAL, "cache" => "session", "status" => status)
            .increment(1);

        Ok(self.insert(key, Arc::new(loaded?)))
    }

    /// Cache-only lookup. A hit is promoted to most-recently-used.
    pub fn get(&self, key: impl Into<CacheKey>) -> Option<Arc<V>> {
        self.lookup(&key.into())
    }

    /// Whether `key` is cached, without touching its recency.
    pub fn contains(&self, key: impl Into<CacheKey>) -> bool {
        self.entries().contains(&key.into())
    }

    /// Cached keys from most- to least-recently used.
    pub fn keys(&self) -> Vec<CacheKey> {
        self.entries().iter().map(|(k, _)| *k).collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries().cap().get()
    }

    /// Number of per-key load locks currently registered.
    ///
    /// Returns to its previous value once a load finishes and nobody else
    /// is waiting on that key.
    pub fn pending_loads(&self) -> usize {
        self.locks.len()
    }

    fn lookup(&self, key: &CacheKey) -> Option<Arc<V>> {
        self.entries().get(key).cloned()
    }

    /// Insert unless already present; the existing entry wins.
    fn insert(&self, key: CacheKey, value: Arc<V>) -> Arc<V> {
        let mut entries = self.entries();
        if let Some(existing) = entries.get(&key) {
            debug!(%key, "session already cached, keeping first result");
            return Arc::clone(existing);
        }
        if let Some((evicted, _)) = entries.push(key, Arc::clone(&value)) {
            metrics::counter!(telemetry::EVICTIONS_TOTAL).increment(1);
            debug!(%evicted, inserted = %key, "evicted least-recently-used session");
        }
        trace!(%key, size = entries.len(), "session cached");
        value
    }

    fn entries(&self) -> MutexGuard<'_, LruCache<CacheKey, Arc<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
