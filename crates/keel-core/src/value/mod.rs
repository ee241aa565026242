//! # Keel Core Values
//!
//! Components exchange in-memory values only. [`Value`] is the tree those
//! values live in: the dependency bag handed to a component's start, the
//! result it returns, and the running-system snapshot that nests every
//! result under its component's dotted path.
//!
//! Data leaves mirror JSON so configuration can flow straight in, while
//! [`Handle`] leaves carry live objects (connection pools, clients, ...)
//! that are shared by reference and retrieved with [`Value::downcast`].
pub mod error;
pub mod path;

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::kernel::constants::PATH_SEPARATOR;

pub use error::ValueError;
pub use path::ComponentPath;

/// Opaque shared object stored inside a [`Value`]
#[derive(Clone)]
pub struct Handle {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Handle {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            inner: value,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Get the shared object back as its concrete type
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let cloned: Arc<dyn Any + Send + Sync> = self.inner.clone();
        Arc::downcast::<T>(cloned).ok()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether both handles point at the same object
    pub fn ptr_eq(&self, other: &Handle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

// Handles are equal only when they share the same allocation.
impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

/// Tree of in-memory values exchanged between components
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Handle(Handle),
}

impl Value {
    /// An empty map
    pub fn map() -> Self {
        Value::Map(BTreeMap::new())
    }

    /// Wrap a live object
    pub fn handle<T: Any + Send + Sync>(value: T) -> Self {
        Value::Handle(Handle::new(value))
    }

    /// Downcast a handle leaf to its concrete type
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Value::Handle(handle) => handle.downcast::<T>(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Get a direct child of a map by its literal key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Look up a nested value.
    ///
    /// At every level a key spelled exactly like the remaining dotted path
    /// wins over descending segment by segment, so configuration documents
    /// with literal `"a.b"` keys resolve the way they read.
    pub fn lookup(&self, path: &ComponentPath) -> Option<&Value> {
        self.lookup_segments(path.segments())
    }

    /// Check whether a nested value exists
    pub fn contains_path(&self, path: &ComponentPath) -> bool {
        self.lookup(path).is_some()
    }

    fn lookup_segments(&self, segments: &[String]) -> Option<&Value> {
        let Some((head, rest)) = segments.split_first() else {
            return Some(self);
        };
        let map = self.as_map()?;
        if !rest.is_empty() {
            if let Some(found) = map.get(&segments.join(PATH_SEPARATOR)) {
                return Some(found);
            }
        }
        map.get(head)?.lookup_segments(rest)
    }

    /// Write a nested value, creating intermediate maps as needed.
    ///
    /// `Null` intermediates are replaced by maps; any other non-map
    /// intermediate is a [`ValueError::PathConflict`] and leaves the tree
    /// untouched. The root path replaces the whole value.
    pub fn insert_path(&mut self, path: &ComponentPath, value: Value) -> Result<(), ValueError> {
        self.insert_segments(path.segments(), value, path)
    }

    fn insert_segments(
        &mut self,
        segments: &[String],
        value: Value,
        full_path: &ComponentPath,
    ) -> Result<(), ValueError> {
        let Some((head, rest)) = segments.split_first() else {
            *self = value;
            return Ok(());
        };
        if self.is_null() {
            *self = Value::map();
        }
        let Value::Map(map) = self else {
            return Err(ValueError::PathConflict {
                path: full_path.to_string(),
                segment: head.clone(),
            });
        };
        if rest.is_empty() {
            map.insert(head.clone(), value);
            return Ok(());
        }
        map.entry(head.clone())
            .or_insert(Value::Null)
            .insert_segments(rest, value, full_path)
    }

    /// Render as JSON. Handles become `"<handle:TypeName>"` strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Handle(handle) => {
                serde_json::Value::String(format!("<handle:{}>", handle.type_name()))
            }
        }
    }

    /// Deserialize a data subtree into a typed structure
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ValueError> {
        serde_json::from_value(self.to_json()).map_err(ValueError::Decode)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl PartialEq<serde_json::Value> for Value {
    fn eq(&self, other: &serde_json::Value) -> bool {
        *self == Value::from(other.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<Handle> for Value {
    fn from(handle: Handle) -> Self {
        Value::Handle(handle)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => serializer.collect_seq(items),
            Value::Map(map) => serializer.collect_map(map),
            Value::Handle(handle) => {
                serializer.collect_str(&format_args!("<handle:{}>", handle.type_name()))
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}
