//! # Keel Core
//!
//! Dependency-ordered lifecycle engine for in-process components.
//!
//! Register named components and the dependencies between them on a
//! [`System`], then `start` it: components start one after another, each
//! after everything it depends on, and receive a dependency bag assembled
//! from the results of those dependencies. `stop` tears down exactly the
//! components that started, in the opposite order.
//!
//! ```no_run
//! use keel_core::{from_fn, System, Value};
//!
//! # async fn run() -> keel_core::Result<()> {
//! let system = System::named("app");
//! system.configure(Value::from(serde_json::json!({"server": {"port": 8080}})))?;
//! system
//!     .register("server", from_fn(|deps: Value| async move { Ok(deps) }))?
//!     .depends_on(["config"])?;
//!
//! let running = system.start().await?;
//! assert_eq!(running.lookup(&"server.config.port".into()).and_then(Value::as_i64), Some(8080));
//! system.stop().await?;
//! # Ok(())
//! # }
//! ```
pub mod component;
pub mod config;
pub mod graph;
pub mod kernel;
pub mod lifecycle;
pub mod registry;
pub mod resolver;
pub mod trace;
pub mod value;

pub use component::{from_fn, BoxError, Completion, Component, ComponentResult, Runnable, Signal};
pub use config::{ConfigFormat, FileConfig};
pub use kernel::error::{Error, Result};
pub use kernel::{Definition, System, SystemOptions};
pub use lifecycle::LifecycleState;
pub use registry::{DependencyEdge, DependencySpec, RegisterOptions, Registry};
pub use trace::{LogSink, NullSink, TraceSink};
pub use value::{ComponentPath, Value};

#[cfg(test)]
mod tests;
