use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::component::{Component, Runnable, RunnableKind};
use crate::registry::dependency::DependencyEdge;
use crate::registry::error::RegistrationError;
use crate::value::ComponentPath;

/// Options accepted by registration calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterOptions {
    /// Dependents receive only the sub-section of this component's result
    /// named after themselves unless their edge says otherwise
    pub scoped: bool,
}

impl RegisterOptions {
    pub fn scoped() -> Self {
        Self { scoped: true }
    }
}

/// A registered component: its name, adapted runnable and dependency edges
#[derive(Clone)]
pub struct ComponentDefinition {
    name: String,
    path: ComponentPath,
    kind: RunnableKind,
    component: Arc<dyn Component>,
    dependencies: Vec<DependencyEdge>,
    scoped: bool,
}

impl ComponentDefinition {
    /// Validate and adapt a runnable. The dependency list starts empty.
    pub fn new(
        name: &str,
        runnable: Runnable,
        options: RegisterOptions,
    ) -> Result<Self, RegistrationError> {
        let path = ComponentPath::parse(name);
        if path.is_root() || path.segments().iter().any(String::is_empty) {
            return Err(RegistrationError::InvalidName(name.to_string()));
        }
        let kind = runnable.kind();
        let component = runnable
            .into_component()
            .ok_or_else(|| RegistrationError::NullComponent(name.to_string()))?;
        Ok(Self {
            name: name.to_string(),
            path,
            kind,
            component,
            dependencies: Vec::new(),
            scoped: options.scoped,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where this component's result lives in the running system
    pub fn path(&self) -> &ComponentPath {
        &self.path
    }

    pub fn kind(&self) -> RunnableKind {
        self.kind
    }

    pub fn component(&self) -> Arc<dyn Component> {
        self.component.clone()
    }

    pub fn dependencies(&self) -> &[DependencyEdge] {
        &self.dependencies
    }

    pub fn is_scoped(&self) -> bool {
        self.scoped
    }

    pub(crate) fn extend_dependencies(&mut self, edges: Vec<DependencyEdge>) {
        self.dependencies.extend(edges);
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("dependencies", &self.dependencies)
            .field("scoped", &self.scoped)
            .finish()
    }
}
