//! # Keel Core Kernel Errors
//!
//! Defines the crate-level [`Error`] that every fallible [`System`](crate::System)
//! operation returns.
//!
//! Each subsystem owns a typed error enum; [`Error`] wraps them through `#[from]`
//! so callers can match on the precise failure (for example
//! `Error::Graph(GraphError::CyclicDependency(_))`) or just print it.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::error::ConfigError;
use crate::graph::error::GraphError;
use crate::lifecycle::error::LifecycleError;
use crate::registry::error::RegistrationError;
use crate::resolver::error::ResolutionError;
use crate::value::error::ValueError;

/// Top-level error type for Keel
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid registration or dependency declaration
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// The dependency graph could not be ordered
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A dependency could not be supplied at start time
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// A start or stop pass failed
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// A value tree could not be read or written
    #[error(transparent)]
    Value(#[from] ValueError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Catch-all for errors raised outside the typed subsystems
    #[error("{0}")]
    Other(String),
}

/// Result type for Keel operations
pub type Result<T> = StdResult<T, Error>;
