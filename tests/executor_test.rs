//! Tests for [`TimeoutExecutor`] deadlines and worker-pool bounds.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use paddock::{PaddockError, TimeoutExecutor};

#[tokio::test]
async fn returns_result_within_deadline() {
    let executor = TimeoutExecutor::new(2, Duration::from_secs(1));
    let value = executor.run(async { Ok(42) }).await.unwrap();
    assert_eq!(value, 42);
}

#[tokio::test]
async fn propagates_operation_error() {
    let executor = TimeoutExecutor::new(2, Duration::from_secs(1));
    let err = executor
        .run(async { Err::<(), _>(PaddockError::NotFound("round 99".into())) })
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn deadline_exceeded_returns_timeout() {
    let executor = TimeoutExecutor::new(2, Duration::from_millis(20));
    let err = executor
        .run(async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await
        .unwrap_err();

    assert!(err.is_transient());
    match err {
        PaddockError::Timeout { after } => assert_eq!(after, Duration::from_millis(20)),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn per_call_deadline_overrides_default() {
    let executor = TimeoutExecutor::new(1, Duration::from_secs(60));
    let started = Instant::now();
    let result = executor
        .run_with_deadline(
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            },
            Duration::from_millis(20),
        )
        .await;
    assert!(matches!(result, Err(PaddockError::Timeout { .. })));
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn timed_out_operation_keeps_running() {
    let executor = TimeoutExecutor::new(1, Duration::from_millis(20));
    let finished = Arc::new(AtomicBool::new(false));

    let flag = Arc::clone(&finished);
    let result = executor
        .run(async move {
            tokio::time::sleep(Duration::from_millis(60)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;
    assert!(matches!(result, Err(PaddockError::Timeout { .. })));
    assert!(!finished.load(Ordering::SeqCst));
    assert_eq!(executor.busy_workers(), 1, "detached operation still holds its slot");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(finished.load(Ordering::SeqCst), "operation completed in the background");
    assert_eq!(executor.busy_workers(), 0);
}

#[tokio::test]
async fn panicking_operation_is_upstream_error() {
    let executor = TimeoutExecutor::new(1, Duration::from_secs(1));
    let err = executor
        .run(async {
            if true {
                panic!("provider blew up");
            }
            Ok(())
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PaddockError::Upstream(_)));
    // The pool is still usable.
    assert_eq!(executor.run(async { Ok(1) }).await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn saturated_pool_queues_instead_of_failing() {
    let executor = Arc::new(TimeoutExecutor::new(2, Duration::from_secs(5)));
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<_> = (0..6)
        .map(|i| {
            let executor = Arc::clone(&executor);
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            tokio::spawn(async move {
                executor
                    .run(async move {
                        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        running.fetch_sub(1, Ordering::SeqCst);
                        Ok(i)
                    })
                    .await
            })
        })
        .collect();

    let mut results = Vec::new();
    for task in tasks {
        results.push(task.await.expect("task panicked").unwrap());
    }
    results.sort();

    assert_eq!(results, vec![0, 1, 2, 3, 4, 5]);
    assert!(peak.load(Ordering::SeqCst) <= 2, "at most two operations ran at once");
}

#[tokio::test]
async fn queue_time_counts_toward_deadline() {
    let executor = TimeoutExecutor::new(1, Duration::from_millis(50));

    let (_, queued) = tokio::join!(
        executor.run(async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        }),
        async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            executor.run(async { Ok(()) }).await
        },
    );

    assert!(
        matches!(queued, Err(PaddockError::Timeout { .. })),
        "second call never got a worker before its deadline"
    );
}
