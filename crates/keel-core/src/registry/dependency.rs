use serde::{Deserialize, Serialize};

use crate::registry::error::RegistrationError;

/// A normalized dependency edge: `component`'s started value (or its
/// `source` sub-section) lands in the dependent's bag at `destination`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Name of the component depended upon
    pub component: String,
    /// Dotted property of the source's result to extract. `None` means "not
    /// specified" and lets a scoped source pick the section; `Some("")`
    /// always takes the whole result.
    pub source: Option<String>,
    /// Dotted property of the dependency bag to write to
    pub destination: String,
    /// Skip the edge when the source component is not registered
    pub optional: bool,
}

impl DependencyEdge {
    pub fn new(component: impl Into<String>) -> Self {
        let component = component.into();
        Self {
            destination: component.clone(),
            component,
            source: None,
            optional: false,
        }
    }
}

/// Dependency as declared by callers: a bare component name or a record.
///
/// Deserializes from either `"bar"` or
/// `{ "component": "bar", "source": "..", "destination": "..", "optional": true }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencySpec {
    Name(String),
    Record {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        component: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        destination: Option<String>,
        #[serde(default)]
        optional: bool,
    },
}

impl DependencySpec {
    /// Start a record-style declaration on `component`
    pub fn on(component: impl Into<String>) -> Self {
        DependencySpec::Record {
            component: Some(component.into()),
            source: None,
            destination: None,
            optional: false,
        }
    }

    /// Extract only this dotted property of the source's result.
    /// An empty string takes the whole result even from a scoped source.
    pub fn source(self, property: impl Into<String>) -> Self {
        let property = property.into();
        self.update(|source, _, _| *source = Some(property))
    }

    /// Write into this dotted property of the dependency bag
    pub fn destination(self, property: impl Into<String>) -> Self {
        let property = property.into();
        self.update(|_, destination, _| *destination = Some(property))
    }

    pub fn optional(self) -> Self {
        self.update(|_, _, optional| *optional = true)
    }

    fn update(
        self,
        apply: impl FnOnce(&mut Option<String>, &mut Option<String>, &mut bool),
    ) -> Self {
        let (component, mut source, mut destination, mut optional) = match self {
            DependencySpec::Name(name) => (Some(name), None, None, false),
            DependencySpec::Record { component, source, destination, optional } => {
                (component, source, destination, optional)
            }
        };
        apply(&mut source, &mut destination, &mut optional);
        DependencySpec::Record { component, source, destination, optional }
    }

    /// Normalize into an edge of `owner`, rejecting malformed input
    pub fn normalize(&self, owner: &str) -> Result<DependencyEdge, RegistrationError> {
        let invalid = || RegistrationError::InvalidDependency {
            component: owner.to_string(),
            dependency: serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}")),
        };
        match self {
            DependencySpec::Name(name) if name.is_empty() => Err(invalid()),
            DependencySpec::Name(name) => Ok(DependencyEdge::new(name.clone())),
            DependencySpec::Record { component, source, destination, optional } => {
                let component = component.as_deref().filter(|c| !c.is_empty()).ok_or_else(invalid)?;
                let destination = destination.as_deref().unwrap_or(component);
                if destination.is_empty() {
                    return Err(invalid());
                }
                Ok(DependencyEdge {
                    component: component.to_string(),
                    source: source.clone(),
                    destination: destination.to_string(),
                    optional: *optional,
                })
            }
        }
    }
}

impl From<&str> for DependencySpec {
    fn from(name: &str) -> Self {
        DependencySpec::Name(name.to_string())
    }
}

impl From<String> for DependencySpec {
    fn from(name: String) -> Self {
        DependencySpec::Name(name)
    }
}

impl From<&String> for DependencySpec {
    fn from(name: &String) -> Self {
        DependencySpec::Name(name.clone())
    }
}

impl From<DependencyEdge> for DependencySpec {
    fn from(edge: DependencyEdge) -> Self {
        DependencySpec::Record {
            component: Some(edge.component),
            source: edge.source,
            destination: Some(edge.destination),
            optional: edge.optional,
        }
    }
}
