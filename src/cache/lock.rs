//! Per-key load locks.
//!
//! [`LockRegistry`] hands out one async mutex per key so concurrent cache
//! misses for the same key queue behind a single upstream load. Locks are
//! reference counted: the registry holds one `Arc`, every outstanding
//! [`LoadLock`] handle holds another. A lock whose only reference is the
//! registry's has no holder and no waiter, and can be dropped.
//!
//! Handles retire themselves on drop. Retiring removes the handle's own lock
//! when it was the last reference, and once the table grows past the sweep
//! threshold it also sweeps every other idle lock. Two handles retiring at
//! the same moment can each see the other's reference and leave the lock
//! behind; the sweep collects those.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::MutexGuard as AsyncMutexGuard;
use tracing::trace;

/// Registry size above which a retiring handle sweeps all idle locks.
pub const DEFAULT_SWEEP_THRESHOLD: usize = 20;

type SharedLock = Arc<AsyncMutex<()>>;

/// Table of per-key load locks.
pub struct LockRegistry<K> {
    locks: Mutex<HashMap<K, SharedLock>>,
    sweep_threshold: usize,
}

impl<K: Eq + Hash + Clone> LockRegistry<K> {
    pub fn new() -> Self {
        Self::with_sweep_threshold(DEFAULT_SWEEP_THRESHOLD)
    }

    pub fn with_sweep_threshold(sweep_threshold: usize) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            sweep_threshold,
        }
    }

    /// Get a handle on the load lock for `key`, creating it if absent.
    ///
    /// Lookup and creation happen under the registry-wide mutex, so two
    /// callers can never end up with different locks for the same key.
    /// The handle does not hold the lock; call [`LoadLock::lock`].
    pub fn acquire(&self, key: &K) -> LoadLock<'_, K> {
        let lock = {
            let mut locks = self.table();
            Arc::clone(locks.entry(key.clone()).or_default())
        };
        LoadLock {
            registry: self,
            key: key.clone(),
            lock,
        }
    }

    /// Remove the lock for `key` if nobody holds a handle on it.
    ///
    /// Returns `true` if a lock was removed.
    pub fn release(&self, key: &K) -> bool {
        let mut locks = self.table();
        match locks.get(key) {
            Some(lock) if Arc::strong_count(lock) == 1 => {
                locks.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Remove every lock with no outstanding handle. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let mut locks = self.table();
        Self::sweep_idle(&mut locks)
    }

    /// Number of locks currently registered.
    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn table(&self) -> MutexGuard<'_, HashMap<K, SharedLock>> {
        // The table holds no invariant a panicking holder could break.
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sweep_idle(locks: &mut HashMap<K, SharedLock>) -> usize {
        let before = locks.len();
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - locks.len()
    }

    /// Called from [`LoadLock::drop`] while the handle still owns its `Arc`.
    fn retire(&self, key: &K, handle: &SharedLock) {
        let mut locks = self.table();
        // Registry + this handle: nobody else can clone it while we hold
        // the table, so it is safe to drop.
        if let Some(lock) = locks.get(key) {
            if Arc::ptr_eq(lock, handle) && Arc::strong_count(lock) == 2 {
                locks.remove(key);
            }
        }
        if locks.len() > self.sweep_threshold {
            let removed = Self::sweep_idle(&mut locks);
            trace!(removed, remaining = locks.len(), "swept idle load locks");
        }
    }
}

impl<K: Eq + Hash + Clone> Default for LockRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle on one key's load lock. Retires the lock from its registry on drop.
pub struct LoadLock<'a, K: Eq + Hash + Clone> {
    registry: &'a LockRegistry<K>,
    key: K,
    lock: SharedLock,
}

impl<K: Eq + Hash + Clone> LoadLock<'_, K> {
    /// Wait for exclusive access to this key's load.
    pub async fn lock(&self) -> AsyncMutexGuard<'_, ()> {
        self.lock.lock().await
    }

    pub fn key(&self) -> &K {
        &self.key
    }
}

impl<K: Eq + Hash + Clone> Drop for LoadLock<'_, K> {
    fn drop(&mut self) {
        self.registry.retire(&self.key, &self.lock);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_reuses_lock_for_same_key() {
        let registry = LockRegistry::new();
        let a = registry.acquire(&1);
        let b = registry.acquire(&1);
        assert!(Arc::ptr_eq(&a.lock, &b.lock));
        assert_eq!(registry.len(), 1);

        let c = registry.acquire(&2);
        assert!(!Arc::ptr_eq(&a.lock, &c.lock));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn last_handle_drop_removes_lock() {
        let registry = LockRegistry::new();
        let a = registry.acquire(&"k");
        let b = registry.acquire(&"k");
        drop(a);
        assert_eq!(registry.len(), 1, "second handle still references the lock");
        drop(b);
        assert!(registry.is_empty());
    }

    #[test]
    fn release_skips_referenced_locks() {
        let registry = LockRegistry::new();
        let handle = registry.acquire(&7);
        assert!(!registry.release(&7));
        assert_eq!(registry.len(), 1);
        drop(handle);
        assert!(!registry.release(&7), "already retired on drop");
    }

    #[test]
    fn sweep_removes_only_idle_locks() {
        let registry: LockRegistry<u32> = LockRegistry::new();
        let held = registry.acquire(&1);
        // Plant idle entries directly, as racing retirements would leave them.
        for key in 2..5 {
            registry.table().insert(key, SharedLock::default());
        }
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.sweep(), 3);
        assert_eq!(registry.len(), 1);
        drop(held);
        assert!(registry.is_empty());
    }

    #[test]
    fn retire_sweeps_past_threshold() {
        let registry: LockRegistry<u32> = LockRegistry::with_sweep_threshold(2);
        for key in 10..15 {
            registry.table().insert(key, SharedLock::default());
        }
        drop(registry.acquire(&1));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn lock_is_exclusive_per_key() {
        let registry = LockRegistry::new();
        let a = registry.acquire(&1);
        let b = registry.acquire(&1);
        let guard = a.lock().await;
        assert!(b.lock.try_lock().is_err());
        drop(guard);
        assert!(b.lock.try_lock().is_ok());
    }
}
