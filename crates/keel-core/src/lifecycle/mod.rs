//! # Keel Core Lifecycle
//!
//! Drives start and stop passes over a registry.
//!
//! A start pass walks the start order one component at a time: resolve the
//! dependency bag, start the component, record it as started, fold its
//! result into the snapshot. A completed pass is cached so a second start
//! returns it without touching any component. A stop pass walks the stop
//! order restricted to the components that actually started. Only a stop
//! pass that stops all of them drops the cached snapshot.
pub mod error;
pub mod runner;

use std::fmt;

pub use error::LifecycleError;
pub use runner::LifecycleRunner;

/// Published state of a system's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Not running. Components may still be started after a failed pass.
    #[default]
    Idle,
    Starting,
    /// A start pass completed and its snapshot is cached
    Running,
    Stopping,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Starting => "starting",
            LifecycleState::Running => "running",
            LifecycleState::Stopping => "stopping",
        };
        f.write_str(label)
    }
}
