#![cfg(test)]

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::component::{Completion, Component, ComponentResult, Signal};
use crate::trace::TraceSink;
use crate::value::Value;

// ===== EVENT LOG =====

/// Ordered record of what mock components did, shared across a test
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, event: &str) -> usize {
        let events = self.events();
        events
            .iter()
            .position(|e| e == event)
            .unwrap_or_else(|| panic!("{event} not recorded in {events:?}"))
    }

    pub fn contains(&self, event: &str) -> bool {
        self.events().iter().any(|e| e == event)
    }
}

// ===== MOCK COMPONENTS =====

/// How a probe reports completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Resolve the returned signal
    Promise,
    /// Return `Deferred` and settle the completion handle from another task
    Callback,
}

/// Counters a probe shares with the test after it has been registered
#[derive(Default)]
pub struct ProbeStats {
    starts: AtomicUsize,
    stops: AtomicUsize,
    received: Mutex<Option<Value>>,
}

impl ProbeStats {
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    /// Dependency bag passed to the most recent start
    pub fn received(&self) -> Option<Value> {
        self.received.lock().unwrap().clone()
    }
}

/// Configurable mock component recording every start and stop
pub struct Probe {
    name: String,
    log: EventLog,
    style: Style,
    result: Value,
    fail_start: bool,
    fail_stop: bool,
    stats: Arc<ProbeStats>,
}

impl Probe {
    pub fn new(name: &str, log: &EventLog) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
            style: Style::Promise,
            result: Value::from(name),
            fail_start: false,
            fail_stop: false,
            stats: Arc::new(ProbeStats::default()),
        }
    }

    pub fn callback(mut self) -> Self {
        self.style = Style::Callback;
        self
    }

    pub fn returning(mut self, result: impl Into<Value>) -> Self {
        self.result = result.into();
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    pub fn stats(&self) -> Arc<ProbeStats> {
        self.stats.clone()
    }

    fn settle<T: Send + 'static>(
        &self,
        outcome: ComponentResult<T>,
        completion: Completion<T>,
    ) -> Signal<T> {
        match self.style {
            Style::Promise => outcome.into(),
            Style::Callback => {
                tokio::spawn(async move {
                    tokio::task::yield_now().await;
                    completion.complete(outcome);
                });
                Signal::Deferred
            }
        }
    }
}

#[async_trait]
impl Component for Probe {
    async fn start(&self, dependencies: Value, completion: Completion<Value>) -> Signal<Value> {
        self.stats.starts.fetch_add(1, Ordering::SeqCst);
        *self.stats.received.lock().unwrap() = Some(dependencies);
        self.log.record(format!("start:{}", self.name));
        let outcome: ComponentResult<Value> = if self.fail_start {
            Err("Oh Noes!".into())
        } else {
            Ok(self.result.clone())
        };
        self.settle(outcome, completion)
    }

    async fn stop(&self, completion: Completion<()>) -> Signal<()> {
        self.stats.stops.fetch_add(1, Ordering::SeqCst);
        self.log.record(format!("stop:{}", self.name));
        let outcome: ComponentResult<()> = if self.fail_stop {
            Err("Oh Noes!".into())
        } else {
            Ok(())
        };
        self.settle(outcome, completion)
    }
}

/// Signals completion through both channels, callback first
pub struct DoubleSignal;

#[async_trait]
impl Component for DoubleSignal {
    async fn start(&self, _dependencies: Value, completion: Completion<Value>) -> Signal<Value> {
        completion.succeed(Value::from("first"));
        Signal::ok(Value::from("second"))
    }
}

/// Defers and then drops its completion handle
pub struct Forgetful;

#[async_trait]
impl Component for Forgetful {
    async fn start(&self, _dependencies: Value, completion: Completion<Value>) -> Signal<Value> {
        drop(completion);
        Signal::Deferred
    }
}

/// Live object shared between components through a handle
#[derive(Debug, Default)]
pub struct Pool {
    pub checkouts: AtomicUsize,
}

// ===== TRACE SINK =====

/// Trace sink keeping every line for assertions
#[derive(Clone, Default)]
pub struct RecordingSink(Arc<Mutex<Vec<String>>>);

impl RecordingSink {
    pub fn lines(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl TraceSink for RecordingSink {
    fn trace(&self, system: &str, args: fmt::Arguments<'_>) {
        self.0.lock().unwrap().push(format!("{system}: {args}"));
    }
}
