use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::kernel::constants::PATH_SEPARATOR;

/// Position of a component (or a property) inside a nested value tree.
///
/// A dotted name such as `"mongo.primary"` becomes the segments
/// `["mongo", "primary"]`. The empty string is the empty path, which
/// addresses the whole tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ComponentPath {
    segments: Vec<String>,
}

impl ComponentPath {
    /// Parse a dotted name into path segments
    pub fn parse(name: &str) -> Self {
        if name.is_empty() {
            return Self::root();
        }
        Self {
            segments: name.split(PATH_SEPARATOR).map(str::to_string).collect(),
        }
    }

    /// The empty path
    pub fn root() -> Self {
        Self { segments: Vec::new() }
    }

    /// Build a path from already split segments
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// First segment and the remaining path, if any
    pub fn split_first(&self) -> Option<(&str, ComponentPath)> {
        self.segments.split_first().map(|(head, rest)| {
            (head.as_str(), ComponentPath::from_segments(rest.iter().cloned()))
        })
    }

    /// Append a segment, returning the extended path
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }
}

impl fmt::Display for ComponentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                f.write_str(PATH_SEPARATOR)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for ComponentPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for ComponentPath {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl From<&String> for ComponentPath {
    fn from(name: &String) -> Self {
        Self::parse(name)
    }
}

impl Serialize for ComponentPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ComponentPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}
