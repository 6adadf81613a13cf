//! Telemetry metric name constants.
//!
//! Centralised metric names for paddock's caches and upstream calls.
//! Consumers install their own `metrics` recorder (e.g. prometheus, statsd);
//! without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `paddock_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `cache`: which cache: "session" or "schedule"
//! - `status`: load outcome: "ok" or "error"

/// Total cache hits.
///
/// Labels: `cache`.
pub const CACHE_HITS_TOTAL: &str = "paddock_cache_hits_total";

/// Total cache misses (first lookup, before the load lock).
///
/// Labels: `cache`.
pub const CACHE_MISSES_TOTAL: &str = "paddock_cache_misses_total";

/// Misses that were satisfied by another caller's load while waiting on
/// the per-key load lock.
///
/// Labels: `cache`.
pub const COALESCED_TOTAL: &str = "paddock_coalesced_total";

/// Total upstream loads started.
///
/// Labels: `cache`, `status` ("ok" | "error").
pub const LOADS_TOTAL: &str = "paddock_loads_total";

/// Upstream load duration in seconds, measured by the executor.
pub const LOAD_DURATION_SECONDS: &str = "paddock_load_duration_seconds";

/// Total entries evicted from the session cache to respect capacity.
pub const EVICTIONS_TOTAL: &str = "paddock_evictions_total";

/// Total upstream operations that exceeded their deadline.
pub const TIMEOUTS_TOTAL: &str = "paddock_timeouts_total";

/// Total schedule requests answered from an expired snapshot after a
/// failed refresh.
pub const STALE_FALLBACKS_TOTAL: &str = "paddock_stale_fallbacks_total";
