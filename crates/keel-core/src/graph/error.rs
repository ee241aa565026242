//! # Keel Core Graph Errors
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// The names along the cycle, first name repeated at the end
    #[error("Cyclic dependency found: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),
}
