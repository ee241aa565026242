//! # Keel Core Resolver Errors
use thiserror::Error;

use crate::value::ValueError;

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Component {component} has an unsatisfied dependency on {dependency}")]
    UnsatisfiedDependency { component: String, dependency: String },

    #[error("Component {component} cannot receive dependency at '{destination}': {source}")]
    InvalidDestination {
        component: String,
        destination: String,
        #[source]
        source: ValueError,
    },

    #[error("Component {0} is not registered")]
    UnknownComponent(String),
}
