use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::component::Runnable;
use crate::graph::DependencyGraph;
use crate::kernel::constants::{CONFIG_COMPONENT, DEFAULT_SYSTEM_PREFIX, GENERATED_NAME_DIGITS};
use crate::kernel::error::Result;
use crate::lifecycle::{LifecycleRunner, LifecycleState};
use crate::registry::{DependencySpec, RegisterOptions, RegistrationError, Registry};
use crate::trace::{LogSink, TraceSink, Tracer};
use crate::value::Value;

/// Construction options for a [`System`]
#[derive(Clone)]
pub struct SystemOptions {
    /// System name used in logs and trace lines. Generated when absent.
    pub name: Option<String>,
    /// Where trace lines go
    pub sink: Arc<dyn TraceSink>,
}

impl SystemOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_sink(mut self, sink: impl TraceSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }
}

impl Default for SystemOptions {
    fn default() -> Self {
        Self {
            name: None,
            sink: Arc::new(LogSink),
        }
    }
}

impl fmt::Debug for SystemOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemOptions")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn generate_name() -> String {
    let suffix = rand::random::<u32>();
    format!(
        "{}-{:0width$x}",
        DEFAULT_SYSTEM_PREFIX,
        suffix,
        width = GENERATED_NAME_DIGITS
    )
}

/// A set of components and the machinery to start and stop them.
///
/// `System` is a cheap handle: clones share the same registry and lifecycle.
/// Registration calls are synchronous and take effect for the next start
/// pass. Lifecycle calls are serialized, so a `start` issued while another
/// is in flight waits for it and then returns its cached result.
#[derive(Clone)]
pub struct System {
    name: Arc<str>,
    registry: Arc<RwLock<Registry>>,
    runner: Arc<Mutex<LifecycleRunner>>,
    state: watch::Receiver<LifecycleState>,
    tracer: Tracer,
}

impl System {
    /// Create a system with a generated name, tracing to the `log` facade
    pub fn new() -> Self {
        Self::with_options(SystemOptions::default())
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::with_options(SystemOptions::named(name))
    }

    pub fn with_options(options: SystemOptions) -> Self {
        let name: Arc<str> = Arc::from(options.name.unwrap_or_else(generate_name));
        let tracer = Tracer::new(name.clone(), options.sink);
        let runner = LifecycleRunner::new(tracer.clone());
        let state = runner.subscribe();
        Self {
            name,
            registry: Arc::new(RwLock::new(Registry::new())),
            runner: Arc::new(Mutex::new(runner)),
            state,
            tracer,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn read_registry(&self) -> Result<RwLockReadGuard<'_, Registry>> {
        self.registry
            .read()
            .map_err(|_| RegistrationError::RegistryPoisoned.into())
    }

    fn write_registry(&self) -> Result<RwLockWriteGuard<'_, Registry>> {
        self.registry
            .write()
            .map_err(|_| RegistrationError::RegistryPoisoned.into())
    }

    // --- Definition ---

    /// Register a component under a name that must not be taken yet
    pub fn register(&self, name: &str, runnable: impl Into<Runnable>) -> Result<Definition<'_>> {
        self.register_with(name, runnable, RegisterOptions::default())
    }

    pub fn register_with(
        &self,
        name: &str,
        runnable: impl Into<Runnable>,
        options: RegisterOptions,
    ) -> Result<Definition<'_>> {
        self.tracer.trace(format_args!("Adding component {}", name));
        self.write_registry()?.register(name, runnable.into(), options)?;
        Ok(Definition::new(self, name))
    }

    /// Register a grouping node whose result is its own dependency bag
    pub fn group(&self, name: &str) -> Result<Definition<'_>> {
        self.register(name, Runnable::Identity)
    }

    /// Register the scoped configuration component
    pub fn configure(&self, runnable: impl Into<Runnable>) -> Result<Definition<'_>> {
        self.register_with(CONFIG_COMPONENT, runnable, RegisterOptions::scoped())
    }

    /// Register or overwrite a component. Its dependencies start over.
    pub fn replace(&self, name: &str, runnable: impl Into<Runnable>) -> Result<Definition<'_>> {
        self.replace_with(name, runnable, RegisterOptions::default())
    }

    pub fn replace_with(
        &self,
        name: &str,
        runnable: impl Into<Runnable>,
        options: RegisterOptions,
    ) -> Result<Definition<'_>> {
        self.tracer.trace(format_args!("Setting component {}", name));
        self.write_registry()?.replace(name, runnable.into(), options)?;
        Ok(Definition::new(self, name))
    }

    /// Remove a component. Unknown names are ignored.
    pub fn remove(&self, name: &str) -> Result<&Self> {
        self.tracer.trace(format_args!("Removing component {}", name));
        self.write_registry()?.remove(name);
        Ok(self)
    }

    /// Declare dependencies of the most recently registered component
    pub fn depends_on<I, D>(&self, specs: I) -> Result<&Self>
    where
        I: IntoIterator<Item = D>,
        D: Into<DependencySpec>,
    {
        self.write_registry()?.declare_dependencies(specs)?;
        Ok(self)
    }

    /// Overlay another system's definitions onto this one; incoming
    /// definitions win on name collisions
    pub fn include(&self, other: &System) -> Result<&Self> {
        self.tracer.trace(format_args!(
            "Including definitions from system {}",
            other.name()
        ));
        let incoming = other.registry()?;
        self.write_registry()?.include(&incoming);
        Ok(self)
    }

    /// Same as [`System::include`]
    pub fn merge(&self, other: &System) -> Result<&Self> {
        self.include(other)
    }

    /// Overlay a bare registry onto this system
    pub fn include_registry(&self, registry: &Registry) -> Result<&Self> {
        self.write_registry()?.include(registry);
        Ok(self)
    }

    // --- Introspection ---

    /// Snapshot of the current definitions
    pub fn registry(&self) -> Result<Registry> {
        Ok(self.read_registry()?.clone())
    }

    /// Order the next start pass would start components in
    pub fn start_order(&self) -> Result<Vec<String>> {
        let registry = self.read_registry()?;
        let order = DependencyGraph::from_registry(&registry)
            .sort()?
            .retain_defined(&registry);
        Ok(order.start_order())
    }

    /// Order a full stop pass would stop components in
    pub fn stop_order(&self) -> Result<Vec<String>> {
        let registry = self.read_registry()?;
        let order = DependencyGraph::from_registry(&registry)
            .sort()?
            .retain_defined(&registry);
        Ok(order.stop_order())
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Watch lifecycle state transitions
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.clone()
    }

    /// Components started and not yet stopped, in start order
    pub async fn started(&self) -> Vec<String> {
        self.runner.lock().await.started()
    }

    // --- Lifecycle ---

    /// Start every component, dependencies first, and return the running
    /// system. Returns the cached result if the system is already running,
    /// and refuses to start while components of a failed start are still
    /// running (see [`LifecycleRunner::start`]).
    pub async fn start(&self) -> Result<Value> {
        let mut runner = self.runner.lock().await;
        let registry = self.registry()?;
        runner.start(&registry).await
    }

    /// Stop every component that started, dependents first. If a component
    /// fails to stop, the ones after it are left running and a running
    /// system keeps its cached result.
    pub async fn stop(&self) -> Result<()> {
        self.runner.lock().await.stop().await
    }

    /// Stop then start. Every component is started again.
    pub async fn restart(&self) -> Result<Value> {
        let mut runner = self.runner.lock().await;
        let registry = self.registry()?;
        runner.restart(&registry).await
    }

    /// Start on a spawned task and hand the outcome to `callback` there
    pub fn start_with<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<Value>) + Send + 'static,
    {
        let system = self.clone();
        tokio::spawn(async move { callback(system.start().await) })
    }

    pub fn stop_with<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        let system = self.clone();
        tokio::spawn(async move { callback(system.stop().await) })
    }

    pub fn restart_with<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<Value>) + Send + 'static,
    {
        let system = self.clone();
        tokio::spawn(async move { callback(system.restart().await) })
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("System")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Handle on the definition a registration call just wrote
#[derive(Debug, Clone)]
pub struct Definition<'a> {
    system: &'a System,
    name: String,
}

impl<'a> Definition<'a> {
    fn new(system: &'a System, name: &str) -> Self {
        Self {
            system,
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn system(&self) -> &'a System {
        self.system
    }

    /// Declare dependencies of this definition
    pub fn depends_on<I, D>(self, specs: I) -> Result<Self>
    where
        I: IntoIterator<Item = D>,
        D: Into<DependencySpec>,
    {
        self.system
            .write_registry()?
            .declare_dependencies_for(&self.name, specs)?;
        Ok(self)
    }
}
