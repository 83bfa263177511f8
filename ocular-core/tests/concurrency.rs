//! Concurrency tests for EventDispatcher
//!
//! These tests validate that the registration table is safe to use from
//! several threads:
//! - Dispatch racing with unsubscribe never invokes a removed handler twice
//!   or deadlocks
//! - Handlers may re-enter the dispatcher from inside a dispatch

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use ocular_api::{PluginError, PluginInstanceId};
use ocular_core::EventDispatcher;

#[test]
fn concurrent_dispatch_and_unsubscribe_dont_deadlock() {
    let dispatcher = Arc::new(EventDispatcher::new());
    let hits = Arc::new(AtomicUsize::new(0));

    for raw in 1..=8 {
        let counter = hits.clone();
        dispatcher
            .subscribe(
                PluginInstanceId::new(raw),
                "tick",
                Arc::new(move |_: &str, _: &str| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
            )
            .unwrap();
    }

    let barrier = Arc::new(Barrier::new(5));
    let mut workers = Vec::new();
    for _ in 0..4 {
        let dispatcher = dispatcher.clone();
        let barrier = barrier.clone();
        workers.push(thread::spawn(move || {
            barrier.wait();
            (0..200)
                .map(|_| dispatcher.dispatch("tick", "16ms").delivered)
                .sum::<usize>()
        }));
    }

    barrier.wait();
    for raw in 1..=8 {
        dispatcher.unsubscribe_all(PluginInstanceId::new(raw));
    }

    let delivered: usize = workers.into_iter().map(|w| w.join().unwrap()).sum();

    // Every delivery counted by a report ran exactly once
    assert_eq!(delivered, hits.load(Ordering::SeqCst));
    assert_eq!(dispatcher.handler_count("tick"), 0);
    assert_eq!(dispatcher.dispatch("tick", "16ms").delivered, 0);
}

#[test]
fn handler_may_dispatch_recursively() {
    let dispatcher = Arc::new(EventDispatcher::new());
    let depth = Arc::new(AtomicUsize::new(0));

    let inner = dispatcher.clone();
    let counter = depth.clone();
    dispatcher
        .subscribe(
            PluginInstanceId::new(1),
            "ping",
            Arc::new(move |_: &str, payload: &str| -> Result<(), PluginError> {
                counter.fetch_add(1, Ordering::SeqCst);
                let remaining: usize = payload
                    .parse()
                    .map_err(|_| PluginError::handler("payload must be a count"))?;
                if remaining > 0 {
                    inner.dispatch("ping", &(remaining - 1).to_string());
                }
                Ok(())
            }),
        )
        .unwrap();

    let report = dispatcher.dispatch("ping", "3");

    assert!(report.is_clean());
    assert_eq!(depth.load(Ordering::SeqCst), 4);
}

#[test]
fn handler_may_unsubscribe_its_own_instance() {
    let dispatcher = Arc::new(EventDispatcher::new());
    let hits = Arc::new(AtomicUsize::new(0));
    let owner = PluginInstanceId::new(1);

    let inner = dispatcher.clone();
    let counter = hits.clone();
    dispatcher
        .subscribe(
            owner,
            "once",
            Arc::new(move |_: &str, _: &str| {
                counter.fetch_add(1, Ordering::SeqCst);
                inner.unsubscribe_all(owner);
                Ok(())
            }),
        )
        .unwrap();

    dispatcher.dispatch("once", "");
    dispatcher.dispatch("once", "");

    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
