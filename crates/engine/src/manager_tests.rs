// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::ActionFuture;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::Notify;
use yard_adapters::FakeNotifyAdapter;
use yard_core::{FakeClock, MaxIterations, NotifyLevel};

type TestManager = TaskManager<FakeClock, FakeNotifyAdapter>;

fn setup() -> (TestManager, FakeClock, FakeNotifyAdapter) {
    setup_with(ManagerConfig::default())
}

fn setup_with(config: ManagerConfig) -> (TestManager, FakeClock, FakeNotifyAdapter) {
    let clock = FakeClock::new();
    let notify = FakeNotifyAdapter::new();
    let config = ManagerConfig {
        status_pause: Duration::ZERO,
        ..config
    };
    let manager = TaskManager::new(&config, clock.clone(), notify.clone());
    (manager, clock, notify)
}

/// Wait (bounded) until no run is in flight
async fn settle(manager: &TestManager) {
    tokio::time::timeout(Duration::from_secs(5), manager.until_idle())
        .await
        .unwrap();
}

/// Wait (bounded) until `done` holds, re-checking on every change
async fn wait_for(manager: &TestManager, done: impl Fn() -> bool) {
    let mut changes = manager.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        while !done() {
            let _ = changes.recv().await;
        }
    })
    .await
    .unwrap();
}

/// Action that finishes once the gate is opened
fn gated(gate: &Arc<Notify>) -> impl Fn(TaskHandle) -> ActionFuture + Send + Sync + 'static {
    let gate = Arc::clone(gate);
    move |_| {
        let gate = Arc::clone(&gate);
        Box::pin(async move {
            gate.notified().await;
            Ok(())
        }) as ActionFuture
    }
}

#[tokio::test]
async fn one_shot_task_runs_once_and_is_reaped_next_tick() {
    let (manager, _clock, notify) = setup();
    let handle = manager
        .build()
        .id("A")
        .action(|_| async { Ok(()) })
        .schedule();

    let report = manager.tick();
    assert_eq!(report.started, vec![handle.key()]);
    settle(&manager).await;

    let task = handle.snapshot().unwrap();
    assert!(!task.running);
    assert_eq!(task.iteration, 1);
    assert!(task.is_complete());
    assert!(manager.is_completed("A"));
    assert_eq!(notify.messages(), vec!["A completed"]);

    let report = manager.tick();
    assert!(report.started.is_empty());
    assert_eq!(report.reaped, vec![handle.key()]);
    assert!(handle.snapshot().is_none());
    assert!(manager.tasks().is_empty());
}

#[tokio::test]
async fn dependent_starts_after_dependency_succeeds() {
    let (manager, _clock, _notify) = setup();
    let b = manager
        .build()
        .id("B")
        .depends_on("A")
        .action(|_| async { Ok(()) })
        .schedule();
    let a = manager
        .build()
        .id("A")
        .action(|_| async { Ok(()) })
        .schedule();

    assert_eq!(manager.tick().started, vec![a.key()]);
    assert_eq!(b.snapshot().unwrap().iteration, 0);
    settle(&manager).await;

    let report = manager.tick();
    assert_eq!(report.started, vec![b.key()]);
    assert_eq!(report.reaped, vec![a.key()]);
    settle(&manager).await;
    assert!(manager.is_completed("B"));
}

#[tokio::test]
async fn ceiling_of_one_runs_tasks_one_at_a_time() {
    let (manager, _clock, _notify) = setup();
    let gate = Arc::new(Notify::new());
    let c = manager.build().id("C").action(gated(&gate)).schedule();
    let d = manager
        .build()
        .id("D")
        .action(|_| async { Ok(()) })
        .schedule();

    assert_eq!(manager.tick().started, vec![c.key()]);
    assert!(manager.tick().started.is_empty());
    assert_eq!(
        manager.active_tasks().iter().map(|t| t.key).collect::<Vec<_>>(),
        vec![c.key()]
    );
    assert_eq!(
        manager.pending_tasks().iter().map(|t| t.key).collect::<Vec<_>>(),
        vec![d.key()]
    );

    gate.notify_one();
    settle(&manager).await;
    assert_eq!(manager.tick().started, vec![d.key()]);
}

#[tokio::test]
async fn raising_the_ceiling_starts_more_per_tick() {
    let (manager, _clock, _notify) = setup();
    assert_eq!(manager.max_parallel_tasks(), 1);
    manager.set_max_parallel_tasks(3);
    assert_eq!(manager.max_parallel_tasks(), 3);

    for id in ["a", "b", "c", "d"] {
        manager.build().id(id).action(|_| async { Ok(()) }).schedule();
    }

    assert_eq!(manager.tick().started.len(), 3);
    settle(&manager).await;
}

#[tokio::test]
async fn failed_task_stays_visible_for_grace_window() {
    let (manager, clock, notify) = setup();
    let handle = manager
        .build()
        .name("save")
        .action(|_| async { Err(TaskError::failed("disk full")) })
        .schedule();

    manager.tick();
    settle(&manager).await;

    let task = handle.snapshot().unwrap();
    assert_eq!(task.status, "Error: disk full");
    assert!(task.last_run_failed);
    assert!(task.is_complete());

    let calls = notify.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].level, NotifyLevel::Error);
    assert_eq!(calls[0].message, "save failed: disk full");
    assert_eq!(calls[0].auto_hide, None);

    clock.advance(Duration::from_secs(14));
    assert!(manager.tick().reaped.is_empty());
    clock.advance(Duration::from_secs(1));
    assert_eq!(manager.tick().reaped, vec![handle.key()]);
}

#[tokio::test]
async fn failed_retention_is_configurable() {
    let (manager, _clock, _notify) = setup_with(ManagerConfig {
        failed_retention: Duration::ZERO,
        ..ManagerConfig::default()
    });
    let handle = manager
        .build()
        .action(|_| async { Err(TaskError::failed("nope")) })
        .schedule();

    manager.tick();
    settle(&manager).await;
    assert_eq!(manager.tick().reaped, vec![handle.key()]);
}

#[tokio::test]
async fn retry_waits_for_failure_backoff() {
    let (manager, clock, notify) = setup();
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&attempts);
    let handle = manager
        .build()
        .id("flaky")
        .retry_on_fail(true)
        .action(move |_| {
            let attempt = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(TaskError::failed("timeout"))
                } else {
                    Ok(())
                }
            }
        })
        .schedule();

    manager.tick();
    settle(&manager).await;
    let task = handle.snapshot().unwrap();
    assert_eq!(task.max_iterations, MaxIterations::Limited(2));
    assert!(!task.is_complete());

    clock.advance_ms(4999);
    assert!(manager.tick().started.is_empty());
    clock.advance_ms(1);
    assert_eq!(manager.tick().started, vec![handle.key()]);
    settle(&manager).await;

    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert!(handle.snapshot().unwrap().is_complete());
    assert!(manager.is_completed("flaky"));
    assert_eq!(
        notify.messages(),
        vec!["flaky failed: timeout", "flaky completed"]
    );
}

#[tokio::test]
async fn group_dependency_waits_for_every_member() {
    let (manager, _clock, _notify) = setup();
    manager.set_max_parallel_tasks(2);
    let gate = Arc::new(Notify::new());

    manager
        .build()
        .id("g1")
        .group("G")
        .action(|_| async { Ok(()) })
        .schedule();
    manager
        .build()
        .id("g2")
        .group("G")
        .action(gated(&gate))
        .schedule();
    let after = manager
        .build()
        .id("after")
        .depends_on("G")
        .action(|_| async { Ok(()) })
        .schedule();

    assert_eq!(manager.tick().started.len(), 2);
    wait_for(&manager, || manager.is_completed("g1")).await;

    assert!(manager.completed_ids().contains(&"G".to_string()));
    assert!(!manager.is_completed("G"));
    assert!(manager.tick().started.is_empty());

    gate.notify_one();
    settle(&manager).await;
    assert!(manager.is_completed("G"));
    assert_eq!(manager.tick().started, vec![after.key()]);
    settle(&manager).await;
}

#[tokio::test]
async fn status_and_progress_survive_success() {
    let (manager, _clock, _notify) = setup();
    let handle = manager
        .build()
        .id("import")
        .action(|task: TaskHandle| async move {
            task.set_status("Reading rows").await;
            task.set_progress(0.5);
            Ok(())
        })
        .schedule();

    manager.tick();
    settle(&manager).await;

    let task = handle.snapshot().unwrap();
    assert_eq!(task.status, "Reading rows");
    assert_eq!(task.progress, 0.5);
}

#[tokio::test]
async fn progress_report_sends_change_notification() {
    let (manager, _clock, _notify) = setup();
    let handle = manager.build().schedule();
    let mut changes = manager.subscribe();

    handle.set_progress(0.25);

    assert!(changes.try_recv().is_ok());
    assert_eq!(handle.snapshot().unwrap().progress, 0.25);
}

#[tokio::test]
async fn cancellation_is_silent_and_not_retried() {
    let (manager, _clock, notify) = setup();
    let handle = manager
        .build()
        .id("export")
        .retry_on_fail(true)
        .action(|_| async { Err(TaskError::Cancelled) })
        .schedule();

    manager.tick();
    settle(&manager).await;

    let task = handle.snapshot().unwrap();
    assert_eq!(task.status, "Cancelled");
    assert!(!task.last_run_failed);
    assert_eq!(task.max_iterations, MaxIterations::Limited(1));
    assert!(task.is_complete());
    assert!(notify.calls().is_empty());
    assert!(!manager.is_completed("export"));

    assert_eq!(manager.tick().reaped, vec![handle.key()]);
}

#[tokio::test]
async fn tick_sends_one_change_notification() {
    let (manager, _clock, _notify) = setup();
    manager.set_max_parallel_tasks(2);
    manager.build().action(|_| async { Ok(()) }).schedule();
    manager.build().action(|_| async { Ok(()) }).schedule();

    // The spawned runs cannot progress before the next await
    let mut changes = manager.subscribe();
    assert_eq!(manager.tick().started.len(), 2);
    assert!(changes.try_recv().is_ok());
    assert!(changes.try_recv().is_err());

    // Nothing eligible, nothing to reap
    assert!(!manager.tick().changed());
    assert!(changes.try_recv().is_err());

    settle(&manager).await;
}

#[tokio::test]
async fn repeated_task_honours_delay() {
    let (manager, clock, notify) = setup();
    let runs = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&runs);
    let handle = manager
        .build()
        .id("poll")
        .repeat(3)
        .delay(Duration::from_secs(1))
        .action(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .schedule();

    manager.tick();
    settle(&manager).await;
    assert!(manager.tick().started.is_empty());

    for _ in 0..2 {
        clock.advance(Duration::from_secs(1));
        assert_eq!(manager.tick().started, vec![handle.key()]);
        settle(&manager).await;
    }

    assert_eq!(runs.load(Ordering::SeqCst), 3);
    let task = handle.snapshot().unwrap();
    assert_eq!(task.iteration, 3);
    assert!(task.is_complete());
    assert_eq!(notify.messages().len(), 3);
    assert_eq!(
        manager.completed_ids(),
        vec!["poll".to_string(), "poll".to_string(), "poll".to_string()]
    );
}

#[tokio::test]
async fn forever_task_is_never_reaped() {
    let (manager, _clock, _notify) = setup();
    let handle = manager
        .build()
        .repeat_forever()
        .action(|_| async { Ok(()) })
        .schedule();

    for _ in 0..5 {
        let report = manager.tick();
        assert_eq!(report.started, vec![handle.key()]);
        assert!(report.reaped.is_empty());
        settle(&manager).await;
    }
    assert_eq!(handle.snapshot().unwrap().iteration, 5);
}

#[tokio::test]
async fn panicking_action_becomes_failure() {
    let (manager, _clock, notify) = setup();
    let handle = manager
        .build()
        .name("crashy")
        .action(|_| async {
            let crash = true;
            if crash {
                panic!("boom");
            }
            Ok(())
        })
        .schedule();

    manager.tick();
    settle(&manager).await;

    let task = handle.snapshot().unwrap();
    assert_eq!(task.status, "Error: action panicked");
    assert!(task.last_run_failed);
    assert_eq!(notify.messages(), vec!["crashy failed: action panicked"]);
}

#[tokio::test]
async fn action_panicking_before_its_future_frees_the_slot() {
    let (manager, _clock, notify) = setup();
    let crashy = manager
        .build()
        .name("eager")
        .with_action(Arc::new(|_: TaskHandle| -> ActionFuture {
            panic!("boom before future")
        }))
        .schedule();
    let healthy = manager
        .build()
        .id("healthy")
        .action(|_| async { Ok(()) })
        .schedule();

    let report = manager.tick();
    assert_eq!(report.started, vec![crashy.key()]);
    settle(&manager).await;

    let task = crashy.snapshot().unwrap();
    assert!(!task.running);
    assert!(task.last_run_failed);
    assert_eq!(task.status, "Error: action panicked");

    let report = manager.tick();
    assert_eq!(report.started, vec![healthy.key()]);
    settle(&manager).await;

    assert!(manager.is_completed("healthy"));
    assert_eq!(
        notify.messages(),
        vec!["eager failed: action panicked", "healthy completed"]
    );
}

#[tokio::test]
async fn task_without_action_fails() {
    let (manager, _clock, _notify) = setup();
    let handle = manager.build().id("empty").schedule();

    manager.tick();
    settle(&manager).await;

    assert_eq!(
        handle.snapshot().unwrap().status,
        "Error: no action configured"
    );
}

#[tokio::test]
async fn until_idle_returns_at_once_without_tasks() {
    let (manager, _clock, _notify) = setup();
    settle(&manager).await;
}

#[tokio::test]
async fn ticker_drains_the_task_list() {
    let (manager, _clock, notify) = setup_with(ManagerConfig {
        tick_interval: Duration::from_millis(10),
        ..ManagerConfig::default()
    });
    manager
        .build()
        .id("first")
        .action(|_| async { Ok(()) })
        .schedule();
    manager
        .build()
        .id("second")
        .depends_on("first")
        .action(|_| async { Ok(()) })
        .schedule();

    let ticker = manager.spawn_ticker();
    tokio::time::timeout(Duration::from_secs(5), manager.until_drained())
        .await
        .unwrap();
    ticker.abort();

    assert_eq!(
        notify.messages(),
        vec!["first completed", "second completed"]
    );
}
