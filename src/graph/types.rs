//! Core type definitions for the live graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle of a node slot in the live store
///
/// Handles are never reused: a node that survives a merge keeps its handle,
/// and a removed node's handle is retired for the lifetime of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct NodeHandle(pub u64);

impl NodeHandle {
    pub fn new(id: u64) -> Self {
        NodeHandle(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeHandle({})", self.0)
    }
}

impl From<u64> for NodeHandle {
    fn from(id: u64) -> Self {
        NodeHandle(id)
    }
}

/// Stable handle of an edge slot in the live store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct EdgeHandle(pub u64);

impl EdgeHandle {
    pub fn new(id: u64) -> Self {
        EdgeHandle(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EdgeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeHandle({})", self.0)
    }
}

impl From<u64> for EdgeHandle {
    fn from(id: u64) -> Self {
        EdgeHandle(id)
    }
}

/// Coarse node type, derived from the scheme of a canonical id
///
/// `"person:alice"` and `"person://alice"` are both `Person`. Schemes other
/// than the three render-relevant ones are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Person,
    Project,
    Organization,
    Other(String),
}

impl NodeKind {
    /// Derive the kind from a canonical id: the text before the first `:`
    pub fn from_id(id: &str) -> Self {
        let scheme = id.split(':').next().unwrap_or_default();
        NodeKind::from(scheme)
    }

    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Person => "person",
            NodeKind::Project => "project",
            NodeKind::Organization => "organization",
            NodeKind::Other(scheme) => scheme,
        }
    }

    /// Whether renderers have a dedicated style for this kind
    pub fn is_known(&self) -> bool {
        !matches!(self, NodeKind::Other(_))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for NodeKind {
    fn from(s: &str) -> Self {
        match s {
            "person" => NodeKind::Person,
            "project" => NodeKind::Project,
            "organization" => NodeKind::Organization,
            other => NodeKind::Other(other.to_string()),
        }
    }
}

impl Serialize for NodeKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeKind::from(s.as_str()))
    }
}

/// Edge type (relation label, e.g., "memberOf", "knows")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct EdgeType(String);

impl EdgeType {
    pub fn new(edge_type: impl Into<String>) -> Self {
        EdgeType(edge_type.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EdgeType {
    fn default() -> Self {
        EdgeType::new("relatedTo")
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EdgeType {
    fn from(s: String) -> Self {
        EdgeType(s)
    }
}

impl From<&str> for EdgeType {
    fn from(s: &str) -> Self {
        EdgeType(s.to_string())
    }
}
