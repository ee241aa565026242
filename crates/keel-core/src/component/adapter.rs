use std::fmt;
use std::future::Future;

use async_trait::async_trait;

use crate::component::{BoxFuture, Component, ComponentResult, Completion, Signal};
use crate::value::Value;

/// Adapter for plain values: start returns the value unchanged, stop does nothing
#[derive(Debug, Clone)]
pub struct PassThrough {
    value: Value,
}

impl PassThrough {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

#[async_trait]
impl Component for PassThrough {
    async fn start(&self, _dependencies: Value, _completion: Completion<Value>) -> Signal<Value> {
        Signal::ok(self.value.clone())
    }
}

/// Grouping node: start returns exactly the dependency bag it was given
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

#[async_trait]
impl Component for Identity {
    async fn start(&self, dependencies: Value, _completion: Completion<Value>) -> Signal<Value> {
        Signal::ok(dependencies)
    }
}

type StartFn = Box<dyn Fn(Value) -> BoxFuture<'static, ComponentResult<Value>> + Send + Sync>;
type StopFn = Box<dyn Fn() -> BoxFuture<'static, ComponentResult<()>> + Send + Sync>;

/// Component backed by closures, see [`from_fn`]
pub struct FnComponent {
    start: StartFn,
    stop: Option<StopFn>,
}

impl FnComponent {
    /// Attach a stop operation
    pub fn on_stop<F, Fut>(mut self, stop: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ComponentResult<()>> + Send + 'static,
    {
        self.stop = Some(Box::new(move || Box::pin(stop())));
        self
    }
}

impl fmt::Debug for FnComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnComponent")
            .field("has_stop", &self.stop.is_some())
            .finish_non_exhaustive()
    }
}

/// Build a component from an async start closure
pub fn from_fn<F, Fut>(start: F) -> FnComponent
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ComponentResult<Value>> + Send + 'static,
{
    FnComponent {
        start: Box::new(move |dependencies| Box::pin(start(dependencies))),
        stop: None,
    }
}

#[async_trait]
impl Component for FnComponent {
    async fn start(&self, dependencies: Value, _completion: Completion<Value>) -> Signal<Value> {
        (self.start)(dependencies).await.into()
    }

    async fn stop(&self, _completion: Completion<()>) -> Signal<()> {
        match &self.stop {
            Some(stop) => stop().await.into(),
            None => Signal::ok(()),
        }
    }
}
