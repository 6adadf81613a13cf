//! Tests for metrics integration.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use std::sync::Arc;
use std::time::Duration;

use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use paddock::cache::SessionCache;
use paddock::{CacheKey, PaddockError, TimeoutExecutor, telemetry};

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Sum counter values for a name with a given label value.
fn counter_with_label(snapshot: &SnapshotVec, name: &str, label: &str, value: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| {
            key.kind() == MetricKind::Counter
                && key.key().name() == name
                && key
                    .key()
                    .labels()
                    .any(|l| l.key() == label && l.value() == value)
        })
        .map(|(_, _, _, v)| match v {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

fn cache(capacity: usize, deadline: Duration) -> SessionCache<u32> {
    SessionCache::new(capacity, Arc::new(TimeoutExecutor::new(2, deadline)))
}

// ============================================================================
// Tests
// ============================================================================

/// Runs async code within a local recorder scope on the multi-thread runtime.
///
/// `block_in_place` ensures the sync `with_local_recorder` closure stays
/// on the current thread while `block_on` drives the inner async work.
/// Only metrics emitted by the calling task are captured; the executor's
/// duration histogram is recorded on a worker task.
#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn hits_misses_and_evictions_are_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let cache = cache(1, Duration::from_secs(5));
                for round in [1, 1, 2] {
                    cache
                        .get_or_load(CacheKey::new(2024, round), move || async move { Ok(round) })
                        .await
                        .unwrap();
                }
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(
        counter_with_label(&snapshot, telemetry::CACHE_HITS_TOTAL, "cache", "session"),
        1
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::CACHE_MISSES_TOTAL, "cache", "session"),
        2
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::LOADS_TOTAL, "status", "ok"),
        2
    );
    assert_eq!(counter_total(&snapshot, telemetry::EVICTIONS_TOTAL), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn timeouts_are_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let cache = cache(2, Duration::from_millis(10));
                cache
                    .get_or_load(CacheKey::new(2024, 1), || async {
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        Ok(1)
                    })
                    .await
            })
        })
    });
    assert!(matches!(result, Err(PaddockError::Timeout { .. })));

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(counter_total(&snapshot, telemetry::TIMEOUTS_TOTAL), 1);
    assert_eq!(
        counter_with_label(&snapshot, telemetry::LOADS_TOTAL, "status", "error"),
        1
    );
}

#[tokio::test]
async fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let cache = cache(2, Duration::from_secs(1));
    let value = cache
        .get_or_load(CacheKey::new(2024, 1), || async { Ok(7) })
        .await
        .unwrap();
    assert_eq!(*value, 7);
}
