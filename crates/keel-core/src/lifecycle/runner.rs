use std::sync::Arc;

use tokio::sync::watch;

use crate::component::completion::settle;
use crate::component::{BoxError, Completion, Component, ComponentResult};
use crate::graph::{DependencyGraph, TopologicalOrder};
use crate::kernel::error::Result;
use crate::lifecycle::{LifecycleError, LifecycleState};
use crate::registry::Registry;
use crate::resolver::DependencyResolver;
use crate::trace::Tracer;
use crate::value::Value;

/// A component whose start succeeded in the current pass
struct StartedComponent {
    name: String,
    component: Arc<dyn Component>,
}

/// Restores the published state if a pass is dropped half way
struct PassGuard {
    state: Arc<watch::Sender<LifecycleState>>,
    fallback: LifecycleState,
    armed: bool,
}

impl PassGuard {
    fn new(state: &Arc<watch::Sender<LifecycleState>>, fallback: LifecycleState) -> Self {
        Self {
            state: state.clone(),
            fallback,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PassGuard {
    fn drop(&mut self) {
        if self.armed {
            self.state.send_replace(self.fallback);
        }
    }
}

/// Sequential start/stop engine for one system
pub struct LifecycleRunner {
    tracer: Tracer,
    state: Arc<watch::Sender<LifecycleState>>,
    /// Snapshot of the last fully successful start pass
    running: Option<Value>,
    /// Components started since the last stop, in start order
    started: Vec<StartedComponent>,
    /// Stop order of the pass that produced `started`
    stop_order: Vec<String>,
}

impl LifecycleRunner {
    pub(crate) fn new(tracer: Tracer) -> Self {
        let (state, _) = watch::channel(LifecycleState::Idle);
        Self {
            tracer,
            state: Arc::new(state),
            running: None,
            started: Vec::new(),
            stop_order: Vec::new(),
        }
    }

    /// Watch the published lifecycle state
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Cached snapshot of the running system
    pub fn snapshot(&self) -> Option<&Value> {
        self.running.as_ref()
    }

    /// Names of components started and not yet stopped, in start order
    pub fn started(&self) -> Vec<String> {
        self.started.iter().map(|entry| entry.name.clone()).collect()
    }

    /// Start every component of `registry`, or return the cached snapshot.
    ///
    /// Unlike a plain fold over the start order, a start issued while an
    /// earlier failed pass still has components running is refused with
    /// [`LifecycleError::PartiallyStarted`]: those components would
    /// otherwise be started a second time. Stop or restart first.
    pub async fn start(&mut self, registry: &Registry) -> Result<Value> {
        if let Some(running) = &self.running {
            self.tracer.trace(format_args!("System already running"));
            return Ok(running.clone());
        }
        if !self.started.is_empty() {
            return Err(LifecycleError::PartiallyStarted(self.started()).into());
        }

        log::info!("Starting system {}", self.tracer.system());
        self.tracer.trace(format_args!("Starting system"));
        self.publish(LifecycleState::Starting);
        let guard = PassGuard::new(&self.state, LifecycleState::Idle);

        let outcome = self.start_pass(registry).await;
        guard.disarm();
        match outcome {
            Ok(snapshot) => {
                self.running = Some(snapshot.clone());
                self.publish(LifecycleState::Running);
                self.tracer.trace(format_args!("System started"));
                log::info!("System {} started", self.tracer.system());
                Ok(snapshot)
            }
            Err(err) => {
                self.publish(LifecycleState::Idle);
                log::error!("System {} failed to start: {}", self.tracer.system(), err);
                Err(err)
            }
        }
    }

    async fn start_pass(&mut self, registry: &Registry) -> Result<Value> {
        let order: TopologicalOrder = DependencyGraph::from_registry(registry)
            .sort()?
            .retain_defined(registry);
        self.stop_order = order.stop_order();

        let resolver = DependencyResolver::new(registry);
        let mut snapshot = Value::map();
        for name in order.start_order() {
            let Some(definition) = registry.get(&name) else {
                continue;
            };
            self.tracer.trace(format_args!("Inspecting component {}", name));
            let dependencies = resolver.resolve(&name, &snapshot)?;

            self.tracer.trace(format_args!("Starting component {}", name));
            let component = definition.component();
            let (completion, receiver) = Completion::channel(&name);
            let outcome = settle(
                completion.clone(),
                receiver,
                component.start(dependencies, completion),
            )
            .await;
            let result = Self::settled(&name, "start", outcome, |component, source| {
                LifecycleError::ComponentStartFailure { component, source }
            })?;

            self.started.push(StartedComponent {
                name: name.clone(),
                component,
            });
            snapshot
                .insert_path(definition.path(), result)
                .map_err(|source| LifecycleError::InvalidResult {
                    component: name.clone(),
                    source,
                })?;
            self.tracer.trace(format_args!("Component {} started", name));
            tokio::task::yield_now().await;
        }
        Ok(snapshot)
    }

    /// Stop every component that started, in stop order.
    ///
    /// A stop failure aborts the pass. Components stopped before it are
    /// forgotten; the rest stay started, and a fully started system keeps
    /// its cached snapshot and `Running` state until a stop succeeds.
    pub async fn stop(&mut self) -> Result<()> {
        if self.started.is_empty() {
            self.tracer.trace(format_args!("Nothing to stop"));
            self.running = None;
            self.stop_order.clear();
            self.publish(LifecycleState::Idle);
            return Ok(());
        }

        log::info!("Stopping system {}", self.tracer.system());
        self.tracer.trace(format_args!("Stopping system"));
        let previous = self.state();
        self.publish(LifecycleState::Stopping);
        let guard = PassGuard::new(&self.state, previous);

        let outcome = self.stop_pass().await;
        guard.disarm();
        match outcome {
            Ok(()) => {
                self.running = None;
                self.stop_order.clear();
                self.publish(LifecycleState::Idle);
                self.tracer.trace(format_args!("System stopped"));
                log::info!("System {} stopped", self.tracer.system());
                Ok(())
            }
            Err(err) => {
                self.publish(previous);
                log::error!("System {} failed to stop: {}", self.tracer.system(), err);
                Err(err)
            }
        }
    }

    async fn stop_pass(&mut self) -> Result<()> {
        let order: Vec<String> = self
            .stop_order
            .iter()
            .filter(|name| self.started.iter().any(|entry| &entry.name == *name))
            .cloned()
            .collect();

        for name in order {
            let Some(index) = self.started.iter().position(|entry| entry.name == name) else {
                continue;
            };
            let component = self.started[index].component.clone();

            self.tracer.trace(format_args!("Stopping component {}", name));
            let (completion, receiver) = Completion::channel(&name);
            let outcome = settle(completion.clone(), receiver, component.stop(completion)).await;
            Self::settled(&name, "stop", outcome, |component, source| {
                LifecycleError::ComponentStopFailure { component, source }
            })?;

            self.started.remove(index);
            self.tracer.trace(format_args!("Component {} stopped", name));
            tokio::task::yield_now().await;
        }
        Ok(())
    }

    /// Stop then start, without letting another operation in between
    pub async fn restart(&mut self, registry: &Registry) -> Result<Value> {
        self.stop().await?;
        self.start(registry).await
    }

    /// Map the outcome of a settled operation onto lifecycle errors
    fn settled<T>(
        name: &str,
        operation: &'static str,
        outcome: Option<ComponentResult<T>>,
        failure: impl FnOnce(String, BoxError) -> LifecycleError,
    ) -> std::result::Result<T, LifecycleError> {
        match outcome {
            Some(Ok(value)) => Ok(value),
            Some(Err(source)) => Err(failure(name.to_string(), source)),
            None => Err(LifecycleError::CompletionAbandoned {
                component: name.to_string(),
                operation,
            }),
        }
    }

    fn publish(&self, state: LifecycleState) {
        self.state.send_replace(state);
    }
}
