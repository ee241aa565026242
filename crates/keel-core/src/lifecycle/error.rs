//! # Keel Core Lifecycle Errors
//!
//! Failures of a start or stop pass. Component failures keep the error the
//! component reported as their source.
use thiserror::Error;

use crate::component::BoxError;
use crate::value::ValueError;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Component {component} failed to start: {source}")]
    ComponentStartFailure {
        component: String,
        #[source]
        source: BoxError,
    },

    #[error("Component {component} failed to stop: {source}")]
    ComponentStopFailure {
        component: String,
        #[source]
        source: BoxError,
    },

    #[error("Component {component} dropped its completion handle without finishing {operation}")]
    CompletionAbandoned {
        component: String,
        operation: &'static str,
    },

    #[error("Cannot record result of component {component}: {source}")]
    InvalidResult {
        component: String,
        #[source]
        source: ValueError,
    },

    #[error("System is partially started ({}); stop it before starting again", .0.join(", "))]
    PartiallyStarted(Vec<String>),
}
