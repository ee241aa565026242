//! # Keel Core Registry Errors
//!
//! Errors raised synchronously by registration and dependency declaration.
//! A failing call never leaves the offending definition half-updated.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Duplicate component: {0}")]
    DuplicateComponent(String),

    #[error("Component {0} is null or undefined")]
    NullComponent(String),

    #[error("Component name '{0}' is invalid")]
    InvalidName(String),

    #[error("Component {component} has an invalid dependency {dependency}")]
    InvalidDependency { component: String, dependency: String },

    #[error("Component {component} has a duplicate dependency {destination}")]
    DuplicateDependency { component: String, destination: String },

    #[error("You must add a component before calling depends_on")]
    NoCurrentComponent,

    #[error("Component {0} is not registered")]
    UnknownComponent(String),

    #[error("Component registry lock poisoned")]
    RegistryPoisoned,
}
