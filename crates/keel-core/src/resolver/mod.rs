//! # Keel Core Dependency Resolver
//!
//! Assembles the dependency bag handed to a component's start from the
//! results of components that already started.
//!
//! For every edge the resolver takes the source component's result (or one
//! dotted sub-section of it) and writes it into the bag at the edge's
//! destination. When an edge names no source property and the source
//! component is registered as scoped, the section named after the
//! *dependent* is taken, so a shared configuration component hands each
//! consumer only its own part.
pub mod error;

use crate::registry::{DependencyEdge, Registry};
use crate::value::{ComponentPath, Value};

pub use error::ResolutionError;

/// Resolves dependency bags against one registry
#[derive(Debug, Clone, Copy)]
pub struct DependencyResolver<'a> {
    registry: &'a Registry,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Build the dependency bag of `name` from the running-system snapshot
    pub fn resolve(&self, name: &str, snapshot: &Value) -> Result<Value, ResolutionError> {
        let definition = self
            .registry
            .get(name)
            .ok_or_else(|| ResolutionError::UnknownComponent(name.to_string()))?;

        let mut bag = Value::map();
        for edge in definition.dependencies() {
            let Some(value) = self.resolve_edge(name, edge, snapshot)? else {
                continue;
            };
            let destination = ComponentPath::parse(&edge.destination);
            bag.insert_path(&destination, value)
                .map_err(|source| ResolutionError::InvalidDestination {
                    component: name.to_string(),
                    destination: edge.destination.clone(),
                    source,
                })?;
        }
        Ok(bag)
    }

    /// Value one edge contributes, or `None` for a skipped optional edge
    fn resolve_edge(
        &self,
        name: &str,
        edge: &DependencyEdge,
        snapshot: &Value,
    ) -> Result<Option<Value>, ResolutionError> {
        let unsatisfied = || ResolutionError::UnsatisfiedDependency {
            component: name.to_string(),
            dependency: edge.component.clone(),
        };

        let Some(source) = self.registry.get(&edge.component) else {
            if edge.optional {
                log::debug!(
                    "Skipping optional dependency {} of {}: not registered",
                    edge.component,
                    name
                );
                return Ok(None);
            }
            return Err(unsatisfied());
        };
        let started = snapshot.lookup(source.path()).ok_or_else(unsatisfied)?;

        let property = match edge.source.as_deref() {
            Some(property) => property,
            None if source.is_scoped() => name,
            None => "",
        };
        if property.is_empty() {
            log::debug!(
                "Injecting dependency {} as {} into {}",
                edge.component,
                edge.destination,
                name
            );
            return Ok(Some(started.clone()));
        }

        log::debug!(
            "Injecting dependency {}.{} as {} into {}",
            edge.component,
            property,
            edge.destination,
            name
        );
        let section = started
            .lookup(&ComponentPath::parse(property))
            .cloned()
            .unwrap_or_default();
        Ok(Some(section))
    }
}
