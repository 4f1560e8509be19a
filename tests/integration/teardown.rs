//! Teardown and resource-exhaustion scenarios.

use futurelib::runtime::{FutureRuntime, RuntimeConfig, RuntimeError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_teardown_with_zero_futures_returns_immediately() {
    let rt = FutureRuntime::new();

    let start = Instant::now();
    rt.teardown();
    assert!(start.elapsed() < Duration::from_millis(50));
}

#[test]
fn test_teardown_waits_for_unretrieved_workers() {
    let rt = FutureRuntime::new();
    let finished = Arc::new(AtomicUsize::new(0));

    // None of these futures is ever retrieved; teardown alone must ensure
    // the workers ran to completion.
    for _ in 0..8 {
        let finished = finished.clone();
        rt.async_launch(
            move |x| {
                thread::sleep(Duration::from_millis(100));
                finished.fetch_add(1, Ordering::SeqCst);
                x
            },
            0,
        )
        .unwrap();
    }

    rt.teardown();
    assert_eq!(finished.load(Ordering::SeqCst), 8);
    assert!(rt.registry().is_empty());
}

#[test]
fn test_teardown_after_mixed_retrievals() {
    let rt = FutureRuntime::new();

    let retrieved = rt.async_launch(|x| x * 2, 4).unwrap();
    let freed = rt.async_launch(|x| x * 3, 4).unwrap();
    let _abandoned = rt.async_launch(|x| x * 4, 4).unwrap();

    assert_eq!(rt.get(retrieved).unwrap(), 8);
    rt.free_future(freed).unwrap();

    // Joins the abandoned worker, re-joins nothing for the others.
    rt.teardown();
    assert!(rt.registry().is_empty());
}

#[test]
fn test_capacity_overflow_is_loud_not_silent() {
    let rt = FutureRuntime::with_config(RuntimeConfig {
        max_futures: 8,
        ..RuntimeConfig::default()
    });

    let handles: Vec<_> = (0..8)
        .map(|i| rt.async_launch(|x| x, i).unwrap())
        .collect();

    // The ninth creation fails; nothing is dropped or overwritten.
    match rt.async_launch(|x| x, 999) {
        Err(RuntimeError::RegistryFull { capacity }) => assert_eq!(capacity, 8),
        other => panic!("expected RegistryFull, got {:?}", other),
    }
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(rt.get(handle).unwrap(), i as i64);
    }

    rt.teardown();
}

#[test]
fn test_handles_stay_dead_after_teardown() {
    let rt = FutureRuntime::new();
    let f = rt.async_launch(|x| x, 1).unwrap();

    rt.teardown();

    assert!(matches!(rt.get(f), Err(RuntimeError::HandleFreed(_))));
}
