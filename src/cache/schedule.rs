//! TTL cache for season schedules.
//!
//! A schedule changes rarely, so one snapshot per year is kept for the
//! configured TTL (default one hour). Expiry is lazy: an entry is checked
//! and purged when it is looked up, there is no background reaper.
//!
//! Purged snapshots are not thrown away immediately. The last expired
//! snapshot per year is kept aside and is only reachable through
//! [`ScheduleCache::get_stale`], so a caller whose refresh fails (rate
//! limit, timeout) can choose to serve old data instead of an error. A
//! later [`put`](ScheduleCache::put) for that year drops it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace};

use crate::telemetry;
use crate::types::Schedule;

/// Default time-to-live for a schedule snapshot.
pub const DEFAULT_SCHEDULE_TTL: Duration = Duration::from_secs(3600);

struct ScheduleEntry<V> {
    value: Arc<V>,
    stored_at: Instant,
}

struct Slots<V> {
    fresh: HashMap<i32, ScheduleEntry<V>>,
    expired: HashMap<i32, Arc<V>>,
}

/// Year-keyed cache with a fixed TTL.
pub struct ScheduleCache<V = Schedule> {
    slots: Mutex<Slots<V>>,
    ttl: Duration,
}

impl<V> ScheduleCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: Mutex::new(Slots {
                fresh: HashMap::new(),
                expired: HashMap::new(),
            }),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the snapshot for `year` if it is younger than the TTL.
    ///
    /// An expired snapshot is purged and reported as absent.
    pub fn get(&self, year: i32) -> Option<Arc<V>> {
        let mut slots = self.slots();
        let Some(age) = slots.fresh.get(&year).map(|e| e.stored_at.elapsed()) else {
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "cache" => "schedule").increment(1);
            return None;
        };
        if age < self.ttl {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "cache" => "schedule").increment(1);
            trace!(year, age_ms = age.as_millis() as u64, "schedule cache hit");
            return slots.fresh.get(&year).map(|e| Arc::clone(&e.value));
        }

        if let Some(entry) = slots.fresh.remove(&year) {
            debug!(year, age_ms = age.as_millis() as u64, "schedule entry expired");
            slots.expired.insert(year, entry.value);
        }
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "cache" => "schedule").increment(1);
        None
    }

    /// Store a fresh snapshot for `year`, replacing any previous one.
    pub fn put(&self, year: i32, value: V) -> Arc<V> {
        let value = Arc::new(value);
        let mut slots = self.slots();
        slots.expired.remove(&year);
        slots.fresh.insert(
            year,
            ScheduleEntry {
                value: Arc::clone(&value),
                stored_at: Instant::now(),
            },
        );
        value
    }

    /// The newest snapshot for `year` regardless of age.
    ///
    /// Used only as an explicit fallback after a failed refresh; never
    /// consulted by [`get`](Self::get).
    pub fn get_stale(&self, year: i32) -> Option<Arc<V>> {
        let slots = self.slots();
        slots
            .fresh
            .get(&year)
            .map(|e| Arc::clone(&e.value))
            .or_else(|| slots.expired.get(&year).cloned())
    }

    /// Number of snapshots stored, fresh or not yet purged.
    pub fn len(&self) -> usize {
        self.slots().fresh.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slots(&self) -> MutexGuard<'_, Slots<V>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V> Default for ScheduleCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEDULE_TTL)
    }
}
