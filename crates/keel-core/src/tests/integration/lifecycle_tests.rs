#![cfg(test)]

use std::sync::Arc;

use serde_json::json;
use tokio::sync::oneshot;

use crate::component::Runnable;
use crate::graph::GraphError;
use crate::kernel::error::Error;
use crate::kernel::System;
use crate::lifecycle::{LifecycleError, LifecycleState};
use crate::resolver::ResolutionError;
use crate::tests::integration::common::{DoubleSignal, EventLog, Forgetful, Probe, ProbeStats};
use crate::value::Value;

fn probe(system: &System, name: &str, log: &EventLog) -> Arc<ProbeStats> {
    let probe = Probe::new(name, log);
    let stats = probe.stats();
    system.register(name, Runnable::component(probe)).unwrap();
    stats
}

#[tokio::test]
async fn test_start_without_components() {
    let system = System::new();
    let running = system.start().await.expect("start");
    assert_eq!(running, json!({}));
    system.stop().await.expect("stop");
}

#[tokio::test]
async fn test_dependencies_start_first() {
    let log = EventLog::new();
    let system = System::named("ordering");
    for (name, deps) in [
        ("app", vec!["db", "cache"]),
        ("db", vec!["config"]),
        ("cache", vec!["config"]),
        ("config", vec![]),
    ] {
        system
            .register(name, Runnable::component(Probe::new(name, &log)))
            .unwrap()
            .depends_on(deps)
            .unwrap();
    }

    let running = system.start().await.expect("start");
    assert!(log.position("start:config") < log.position("start:db"));
    assert!(log.position("start:config") < log.position("start:cache"));
    assert!(log.position("start:db") < log.position("start:app"));
    assert!(log.position("start:cache") < log.position("start:app"));
    assert_eq!(
        running,
        json!({"app": "app", "db": "db", "cache": "cache", "config": "config"})
    );

    system.stop().await.expect("stop");
    assert!(log.position("stop:app") < log.position("stop:db"));
    assert!(log.position("stop:db") < log.position("stop:config"));
    assert!(log.position("stop:cache") < log.position("stop:config"));
}

#[tokio::test]
async fn test_dependency_results_are_injected() {
    let log = EventLog::new();
    let system = System::new();
    system
        .register(
            "db",
            Runnable::component(Probe::new("db", &log).returning(json!({"url": "pg://"}))),
        )
        .unwrap();
    let app = Probe::new("app", &log);
    let stats = app.stats();
    system.register("app", Runnable::component(app)).unwrap().depends_on(["db"]).unwrap();

    system.start().await.expect("start");
    assert_eq!(stats.received().expect("app started"), json!({"db": {"url": "pg://"}}));
}

#[tokio::test]
async fn test_callback_components() {
    let log = EventLog::new();
    let system = System::new();
    system
        .register("a", Runnable::component(Probe::new("a", &log).callback().returning(1)))
        .unwrap();
    system
        .register("b", Runnable::component(Probe::new("b", &log).callback()))
        .unwrap()
        .depends_on(["a"])
        .unwrap();

    let running = system.start().await.expect("start");
    assert_eq!(running, json!({"a": 1, "b": "b"}));
    system.stop().await.expect("stop");
    assert_eq!(log.events(), vec!["start:a", "start:b", "stop:b", "stop:a"]);
}

#[tokio::test]
async fn test_unsatisfied_dependency() {
    let log = EventLog::new();
    let system = System::new();
    let stats = probe(&system, "foo", &log);
    system.depends_on(["bar"]).unwrap();

    let err = system.start().await.expect_err("should fail");
    assert!(matches!(
        err,
        Error::Resolution(ResolutionError::UnsatisfiedDependency { ref dependency, .. })
            if dependency == "bar"
    ));
    assert_eq!(err.to_string(), "Component foo has an unsatisfied dependency on bar");
    assert_eq!(stats.starts(), 0);
}

#[tokio::test]
async fn test_direct_cycle_fails_before_any_start() {
    let log = EventLog::new();
    let system = System::new();
    probe(&system, "other", &log);
    probe(&system, "a", &log);
    system.depends_on(["a"]).unwrap();

    let err = system.start().await.expect_err("cycle");
    assert!(matches!(err, Error::Graph(GraphError::CyclicDependency(_))));
    assert!(err.to_string().starts_with("Cyclic dependency found"));
    assert!(log.events().is_empty());
    assert_eq!(system.state(), LifecycleState::Idle);
}

#[tokio::test]
async fn test_indirect_cycle_fails_before_any_start() {
    let log = EventLog::new();
    let system = System::new();
    probe(&system, "standalone", &log);
    system
        .register("a", Runnable::component(Probe::new("a", &log)))
        .unwrap()
        .depends_on(["b"])
        .unwrap();
    system
        .register("b", Runnable::component(Probe::new("b", &log)))
        .unwrap()
        .depends_on(["a"])
        .unwrap();

    let err = system.start().await.expect_err("cycle");
    assert!(matches!(err, Error::Graph(GraphError::CyclicDependency(_))));
    assert!(log.events().is_empty());
}

#[tokio::test]
async fn test_partial_start_then_stop() {
    let log = EventLog::new();
    let system = System::new();
    let a = probe(&system, "a", &log);
    let b = Probe::new("b", &log).failing_start();
    let b_stats = b.stats();
    system.register("b", Runnable::component(b)).unwrap().depends_on(["a"]).unwrap();
    let c = probe(&system, "c", &log);
    system.depends_on(["b"]).unwrap();

    let err = system.start().await.expect_err("b fails");
    match &err {
        Error::Lifecycle(LifecycleError::ComponentStartFailure { component, source }) => {
            assert_eq!(component, "b");
            assert_eq!(source.to_string(), "Oh Noes!");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(c.starts(), 0);
    assert_eq!(system.started().await, vec!["a"]);
    assert_eq!(system.state(), LifecycleState::Idle);

    system.stop().await.expect("stop");
    assert_eq!(a.stops(), 1);
    assert_eq!(b_stats.stops(), 0);
    assert_eq!(c.stops(), 0);
    assert!(system.started().await.is_empty());
}

#[tokio::test]
async fn test_start_refuses_partially_started_system() {
    let log = EventLog::new();
    let system = System::new();
    probe(&system, "a", &log);
    system
        .register("b", Runnable::component(Probe::new("b", &log).failing_start()))
        .unwrap()
        .depends_on(["a"])
        .unwrap();

    system.start().await.expect_err("b fails");
    let err = system.start().await.expect_err("partially started");
    assert!(matches!(
        err,
        Error::Lifecycle(LifecycleError::PartiallyStarted(ref names)) if names == &["a"]
    ));

    // a restart tears down what started before trying again
    system.replace("b", Value::from(2)).unwrap().depends_on(["a"]).unwrap();
    let running = system.restart().await.expect("restart");
    assert_eq!(running, json!({"a": "a", "b": 2}));
}

#[tokio::test]
async fn test_start_is_idempotent_and_restart_restarts() {
    let log = EventLog::new();
    let system = System::new();
    let a = probe(&system, "a", &log);
    let b = probe(&system, "b", &log);
    system.depends_on(["a"]).unwrap();

    let first = system.start().await.expect("start");
    let second = system.start().await.expect("start again");
    assert_eq!(first, second);
    assert_eq!(a.starts(), 1);
    assert_eq!(b.starts(), 1);

    system.restart().await.expect("restart");
    assert_eq!(a.starts(), 2);
    assert_eq!(b.starts(), 2);
    assert_eq!(a.stops(), 1);
    assert_eq!(system.state(), LifecycleState::Running);
}

#[tokio::test]
async fn test_stop_failure_aborts_remaining_stops() {
    let log = EventLog::new();
    let system = System::new();
    let a = probe(&system, "a", &log);
    let b = Probe::new("b", &log).failing_stop();
    let b_stats = b.stats();
    system.register("b", Runnable::component(b)).unwrap().depends_on(["a"]).unwrap();

    let running = system.start().await.expect("start");
    let err = system.stop().await.expect_err("b fails to stop");
    assert!(matches!(
        err,
        Error::Lifecycle(LifecycleError::ComponentStopFailure { ref component, .. })
            if component == "b"
    ));
    assert_eq!(b_stats.stops(), 1);
    assert_eq!(a.stops(), 0);
    assert_eq!(system.state(), LifecycleState::Running);
    assert_eq!(system.started().await, vec!["a", "b"]);

    // still running: start hands back the cached result
    let cached = system.start().await.expect("cached start");
    assert_eq!(cached, running);
    assert_eq!(a.starts(), 1);
    assert_eq!(b_stats.starts(), 1);
}

#[tokio::test]
async fn test_stop_failure_midway_forgets_stopped_components() {
    let log = EventLog::new();
    let system = System::new();
    let a = Probe::new("a", &log).failing_stop();
    let a_stats = a.stats();
    system.register("a", Runnable::component(a)).unwrap();
    let b = probe(&system, "b", &log);
    system.depends_on(["a"]).unwrap();

    system.start().await.expect("start");
    system.stop().await.expect_err("a fails to stop");
    assert_eq!(b.stops(), 1);
    assert_eq!(a_stats.stops(), 1);
    assert_eq!(system.started().await, vec!["a"]);
    assert_eq!(system.state(), LifecycleState::Running);

    // a second stop only retries what is still running
    system.stop().await.expect_err("a fails again");
    assert_eq!(b.stops(), 1);
    assert_eq!(a_stats.stops(), 2);
}

#[tokio::test]
async fn test_stop_without_start_is_noop() {
    let log = EventLog::new();
    let system = System::new();
    let a = probe(&system, "a", &log);
    system.stop().await.expect("stop");
    assert_eq!(a.stops(), 0);
}

#[tokio::test]
async fn test_first_completion_signal_wins() {
    let system = System::new();
    system.register("double", Runnable::component(DoubleSignal)).unwrap();
    let running = system.start().await.expect("start");
    assert_eq!(running, json!({"double": "first"}));
}

#[tokio::test]
async fn test_abandoned_completion_fails_start() {
    let system = System::new();
    system.register("forgetful", Runnable::component(Forgetful)).unwrap();
    let err = system.start().await.expect_err("abandoned");
    assert!(matches!(
        err,
        Error::Lifecycle(LifecycleError::CompletionAbandoned {
            ref component,
            operation: "start",
        }) if component == "forgetful"
    ));
}

#[tokio::test]
async fn test_state_transitions_are_published() {
    let log = EventLog::new();
    let system = System::new();
    probe(&system, "a", &log);
    let mut states = system.subscribe();
    assert_eq!(*states.borrow_and_update(), LifecycleState::Idle);

    system.start().await.expect("start");
    assert_eq!(system.state(), LifecycleState::Running);
    assert!(states.has_changed().expect("sender alive"));
    assert_eq!(*states.borrow_and_update(), LifecycleState::Running);

    system.stop().await.expect("stop");
    assert_eq!(*states.borrow_and_update(), LifecycleState::Idle);
}

#[tokio::test]
async fn test_concurrent_starts_are_serialized() {
    let log = EventLog::new();
    let system = System::new();
    let a = Probe::new("a", &log).callback();
    let stats = a.stats();
    system.register("a", Runnable::component(a)).unwrap();

    let (first, second) = futures::join!(system.start(), system.start());
    assert_eq!(first.expect("first"), second.expect("second"));
    assert_eq!(stats.starts(), 1);
}

#[tokio::test]
async fn test_callbacks_run_on_spawned_task() {
    let log = EventLog::new();
    let system = System::new();
    let a = probe(&system, "a", &log);

    let (started_tx, started_rx) = oneshot::channel();
    let handle = system.start_with(move |result| {
        let _ = started_tx.send(result.map_err(|e| e.to_string()));
    });
    handle.await.expect("task panicked");
    assert_eq!(started_rx.await.unwrap().unwrap(), json!({"a": "a"}));

    let (restarted_tx, restarted_rx) = oneshot::channel();
    system
        .restart_with(move |result| {
            let _ = restarted_tx.send(result.is_ok());
        })
        .await
        .expect("task panicked");
    assert!(restarted_rx.await.unwrap());
    assert_eq!(a.starts(), 2);

    let (stopped_tx, stopped_rx) = oneshot::channel();
    system
        .stop_with(move |result| {
            let _ = stopped_tx.send(result.is_ok());
        })
        .await
        .expect("task panicked");
    assert!(stopped_rx.await.unwrap());
    assert_eq!(a.stops(), 2);
}

#[tokio::test]
async fn test_start_error_delivered_to_callback() {
    let system = System::new();
    system.register("a", Value::from(1)).unwrap().depends_on(["missing"]).unwrap();

    let (tx, rx) = oneshot::channel();
    system
        .start_with(move |result| {
            let _ = tx.send(result.err().map(|e| e.to_string()));
        })
        .await
        .expect("task panicked");
    assert_eq!(
        rx.await.unwrap().as_deref(),
        Some("Component a has an unsatisfied dependency on missing")
    );
}
