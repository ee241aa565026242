use std::fmt;
use std::sync::Arc;

use crate::component::{Component, FnComponent, Identity, PassThrough};
use crate::value::Value;

/// What a definition was registered with
#[derive(Clone)]
pub enum Runnable {
    /// A component exposing start (and optionally stop)
    Component(Arc<dyn Component>),
    /// An opaque value, started as itself
    Value(Value),
    /// No runnable: start hands back the dependency bag
    Identity,
}

/// Which adaptation a registered definition went through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnableKind {
    Component,
    PassThrough,
    Identity,
}

impl Runnable {
    pub fn component<C: Component + 'static>(component: C) -> Self {
        Runnable::Component(Arc::new(component))
    }

    pub fn value(value: impl Into<Value>) -> Self {
        Runnable::Value(value.into())
    }

    pub fn kind(&self) -> RunnableKind {
        match self {
            Runnable::Component(_) => RunnableKind::Component,
            Runnable::Value(_) => RunnableKind::PassThrough,
            Runnable::Identity => RunnableKind::Identity,
        }
    }

    /// Whether this is the nullish runnable that registration rejects
    pub fn is_null(&self) -> bool {
        matches!(self, Runnable::Value(Value::Null))
    }

    /// Resolve into the uniform component interface the runner drives.
    /// Returns `None` for the nullish runnable.
    pub(crate) fn into_component(self) -> Option<Arc<dyn Component>> {
        match self {
            Runnable::Component(component) => Some(component),
            Runnable::Value(Value::Null) => None,
            Runnable::Value(value) => Some(Arc::new(PassThrough::new(value))),
            Runnable::Identity => Some(Arc::new(Identity)),
        }
    }
}

impl fmt::Debug for Runnable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Runnable::Component(_) => f.write_str("Runnable::Component(..)"),
            Runnable::Value(value) => f.debug_tuple("Runnable::Value").field(value).finish(),
            Runnable::Identity => f.write_str("Runnable::Identity"),
        }
    }
}

impl From<Value> for Runnable {
    fn from(value: Value) -> Self {
        Runnable::Value(value)
    }
}

impl From<serde_json::Value> for Runnable {
    fn from(value: serde_json::Value) -> Self {
        Runnable::Value(value.into())
    }
}

impl From<Arc<dyn Component>> for Runnable {
    fn from(component: Arc<dyn Component>) -> Self {
        Runnable::Component(component)
    }
}

impl From<FnComponent> for Runnable {
    fn from(component: FnComponent) -> Self {
        Runnable::component(component)
    }
}
