//! Runtime facade unit tests
//!
//! Exercises launch, retrieval, resolve, free and teardown against a local
//! runtime instance.

use crate::runtime::{FutureRuntime, RuntimeConfig, RuntimeError};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

#[test]
fn test_launch_and_get() {
    let rt = FutureRuntime::new();
    let f = rt.async_launch(|x| x + 1, 41).unwrap();
    assert_eq!(rt.get(f).unwrap(), 42);
    rt.teardown();
}

#[test]
fn test_get_is_idempotent_and_runs_callable_once() {
    let rt = FutureRuntime::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let f = {
        let calls = calls.clone();
        rt.async_launch(
            move |x| {
                calls.fetch_add(1, Ordering::SeqCst);
                x * 2
            },
            10,
        )
        .unwrap()
    };

    assert_eq!(rt.get(f).unwrap(), 20);
    assert_eq!(rt.get(f).unwrap(), 20);
    assert_eq!(rt.get(f).unwrap(), 20);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    rt.teardown();
}

#[test]
fn test_value_not_visible_before_callable_returns() {
    let rt = FutureRuntime::new();
    let (release, gate) = mpsc::channel::<()>();

    let f = rt
        .async_launch(
            move |x| {
                gate.recv().unwrap();
                x
            },
            7,
        )
        .unwrap();

    thread::sleep(Duration::from_millis(50));
    assert!(!rt.is_resolved(f).unwrap());

    release.send(()).unwrap();
    assert_eq!(rt.get(f).unwrap(), 7);
    assert!(rt.is_resolved(f).unwrap());
    rt.teardown();
}

#[test]
fn test_create_and_resolve_manually() {
    let rt = FutureRuntime::new();
    let f = rt.create_future().unwrap();
    assert!(!rt.is_resolved(f).unwrap());

    rt.resolve(f, 55).unwrap();
    assert_eq!(rt.get(f).unwrap(), 55);

    // A second resolve is a programming error.
    assert!(matches!(
        rt.resolve(f, 56),
        Err(RuntimeError::AlreadyResolved(_))
    ));
    rt.teardown();
}

#[test]
fn test_free_future_detects_reuse() {
    let rt = FutureRuntime::new();
    let f = rt.async_launch(|x| x, 1).unwrap();

    rt.free_future(f).unwrap();
    assert!(matches!(rt.get(f), Err(RuntimeError::HandleFreed(_))));
    assert!(matches!(
        rt.free_future(f),
        Err(RuntimeError::HandleFreed(_))
    ));
    rt.teardown();
}

#[test]
fn test_teardown_joins_every_worker() {
    let rt = FutureRuntime::new();
    let finished = Arc::new(AtomicUsize::new(0));

    for i in 0..16u64 {
        let finished = finished.clone();
        rt.async_launch(
            move |x| {
                thread::sleep(Duration::from_millis(5 * (i % 4)));
                finished.fetch_add(1, Ordering::SeqCst);
                x
            },
            i as i64,
        )
        .unwrap();
    }

    rt.teardown();
    // Every worker ran to completion before teardown returned.
    assert_eq!(finished.load(Ordering::SeqCst), 16);
    assert!(rt.registry().is_empty());
}

#[test]
fn test_teardown_with_no_futures_is_noop() {
    let rt = FutureRuntime::new();
    rt.teardown();
    assert!(rt.registry().is_empty());
}

#[test]
fn test_teardown_tolerates_prior_gets_and_frees() {
    let rt = FutureRuntime::new();
    let a = rt.async_launch(|x| x, 1).unwrap();
    let b = rt.async_launch(|x| x, 2).unwrap();
    let c = rt.async_launch(|x| x, 3).unwrap();

    assert_eq!(rt.get(a).unwrap(), 1);
    rt.free_future(b).unwrap();
    let _ = c;

    rt.teardown();
    assert!(rt.registry().is_empty());
}

#[test]
fn test_teardown_releases_bare_futures() {
    let rt = FutureRuntime::new();
    // Created but never launched nor resolved; teardown must not wait on it.
    rt.create_future().unwrap();
    rt.teardown();
    assert!(rt.registry().is_empty());
}

#[test]
fn test_registry_exhaustion_is_surfaced() {
    let rt = FutureRuntime::with_config(RuntimeConfig {
        max_futures: 4,
        ..RuntimeConfig::default()
    });

    let handles: Vec<_> = (0..4)
        .map(|i| rt.async_launch(|x| x, i).unwrap())
        .collect();
    assert!(matches!(
        rt.async_launch(|x| x, 99),
        Err(RuntimeError::RegistryFull { capacity: 4 })
    ));

    for (i, f) in handles.into_iter().enumerate() {
        assert_eq!(rt.get(f).unwrap(), i as i64);
    }
    rt.teardown();
}

#[test]
fn test_stats_track_lifecycle() {
    let rt = FutureRuntime::new();
    let f = rt.async_launch(|x| x, 0).unwrap();
    rt.create_future().unwrap();
    rt.get(f).unwrap();
    rt.teardown();

    let stats = rt.stats();
    assert_eq!(stats.futures_created.load(Ordering::SeqCst), 2);
    assert_eq!(stats.workers_launched.load(Ordering::SeqCst), 1);
    assert_eq!(stats.values_retrieved.load(Ordering::SeqCst), 1);
    assert_eq!(stats.futures_released.load(Ordering::SeqCst), 2);
}

#[test]
fn test_concurrent_launchers() {
    let rt = Arc::new(FutureRuntime::new());

    let launchers: Vec<_> = (0..4)
        .map(|t| {
            let rt = rt.clone();
            thread::spawn(move || {
                (0..25)
                    .map(|i| {
                        let expected = (t * 100 + i) as i64;
                        (rt.async_launch(move |x| x, expected).unwrap(), expected)
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for launcher in launchers {
        for (handle, expected) in launcher.join().unwrap() {
            assert_eq!(rt.get(handle).unwrap(), expected);
        }
    }
    rt.teardown();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_get_returns_callable_result(a in -10_000i64..10_000) {
        let rt = FutureRuntime::new();
        let f = rt
            .async_launch(|x| x.wrapping_mul(3).wrapping_sub(7), a)
            .unwrap();
        prop_assert_eq!(rt.get(f).unwrap(), a.wrapping_mul(3).wrapping_sub(7));
        rt.teardown();
    }
}
