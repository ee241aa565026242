//! # Keel Core Registry
//!
//! The registry holds component definitions in registration order together
//! with their dependency edges. It is the input to every start pass.
//!
//! - **Strict vs. replace**: [`Registry::register`] refuses a name that is
//!   already taken, [`Registry::replace`] overwrites the slot (and its
//!   dependency list), which is how test doubles are swapped in.
//! - **Current definition**: [`Registry::declare_dependencies`] applies to the
//!   most recently registered or replaced definition.
//! - **Composition**: [`Registry::include`] overlays another registry; on a
//!   name collision the incoming definition wins.
pub mod definition;
pub mod dependency;
pub mod error;

use std::collections::HashSet;

use crate::component::Runnable;

pub use definition::{ComponentDefinition, RegisterOptions};
pub use dependency::{DependencyEdge, DependencySpec};
pub use error::RegistrationError;

/// Ordered collection of component definitions
#[derive(Debug, Clone, Default)]
pub struct Registry {
    definitions: Vec<ComponentDefinition>,
    current: Option<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition, failing if the name is already registered
    pub fn register(
        &mut self,
        name: &str,
        runnable: Runnable,
        options: RegisterOptions,
    ) -> Result<(), RegistrationError> {
        if self.contains(name) {
            return Err(RegistrationError::DuplicateComponent(name.to_string()));
        }
        self.replace(name, runnable, options)
    }

    /// Add or overwrite a definition. An overwritten definition keeps its
    /// position but starts over with no dependencies.
    pub fn replace(
        &mut self,
        name: &str,
        runnable: Runnable,
        options: RegisterOptions,
    ) -> Result<(), RegistrationError> {
        let definition = ComponentDefinition::new(name, runnable, options)?;
        self.upsert(definition);
        self.current = Some(name.to_string());
        Ok(())
    }

    /// Delete a definition. Removing an unknown name is not an error.
    pub fn remove(&mut self, name: &str) -> Option<ComponentDefinition> {
        let index = self.position(name)?;
        if self.current.as_deref() == Some(name) {
            self.current = None;
        }
        Some(self.definitions.remove(index))
    }

    /// Declare dependencies of the most recently added definition
    pub fn declare_dependencies<I, D>(&mut self, specs: I) -> Result<(), RegistrationError>
    where
        I: IntoIterator<Item = D>,
        D: Into<DependencySpec>,
    {
        let current = self
            .current
            .clone()
            .filter(|name| self.contains(name))
            .ok_or(RegistrationError::NoCurrentComponent)?;
        self.declare_dependencies_for(&current, specs)
    }

    /// Declare dependencies of a named definition.
    ///
    /// The whole batch is validated before anything is recorded: a malformed
    /// edge or a destination already used by this definition rejects the batch.
    pub fn declare_dependencies_for<I, D>(
        &mut self,
        name: &str,
        specs: I,
    ) -> Result<(), RegistrationError>
    where
        I: IntoIterator<Item = D>,
        D: Into<DependencySpec>,
    {
        let index = self
            .position(name)
            .ok_or_else(|| RegistrationError::UnknownComponent(name.to_string()))?;
        let definition = &mut self.definitions[index];

        let mut destinations: HashSet<String> = definition
            .dependencies()
            .iter()
            .map(|edge| edge.destination.clone())
            .collect();
        let mut edges = Vec::new();
        for spec in specs {
            let edge = spec.into().normalize(name)?;
            if !destinations.insert(edge.destination.clone()) {
                return Err(RegistrationError::DuplicateDependency {
                    component: name.to_string(),
                    destination: edge.destination,
                });
            }
            edges.push(edge);
        }

        log::debug!("Component {} depends on {:?}", name, edges);
        definition.extend_dependencies(edges);
        Ok(())
    }

    /// Overlay another registry's definitions onto this one. Incoming
    /// definitions replace same-named ones in place; new names are appended
    /// in the other registry's order.
    pub fn include(&mut self, other: &Registry) {
        for definition in &other.definitions {
            self.upsert(definition.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&ComponentDefinition> {
        self.definitions.iter().find(|definition| definition.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.definitions.iter().map(ComponentDefinition::name)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ComponentDefinition> + '_ {
        self.definitions.iter()
    }

    /// Name of the definition `declare_dependencies` applies to
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.definitions.iter().position(|definition| definition.name() == name)
    }

    fn upsert(&mut self, definition: ComponentDefinition) {
        match self.position(definition.name()) {
            Some(index) => self.definitions[index] = definition,
            None => self.definitions.push(definition),
        }
    }
}
