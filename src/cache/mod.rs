//! Caching subsystem.
//!
//! Two caches sit between request handlers and the upstream provider:
//!
//! - [`SessionCache`]: bounded LRU of loaded sessions keyed by
//!   (year, round). Misses are coalesced per key through [`LockRegistry`]
//!   and loaded through the shared [`TimeoutExecutor`](crate::TimeoutExecutor).
//!
//! - [`ScheduleCache`]: TTL cache of season schedules keyed by year, with
//!   an explicit stale read for fallback after a failed refresh.
//!
//! Both own their locks; callers only ever see the operations below.

mod lock;
mod schedule;
mod session;

pub use lock::{DEFAULT_SWEEP_THRESHOLD, LoadLock, LockRegistry};
pub use schedule::{DEFAULT_SCHEDULE_TTL, ScheduleCache};
pub use session::{DEFAULT_SESSION_CAPACITY, SessionCache};
