//! Raw and live edges
//!
//! A [`RawEdge`] references its endpoints by canonical id, as produced by a
//! source. A [`LiveEdge`] references live nodes by handle and carries the
//! bookkeeping the renderer needs: a physics index and the multi-edge layout.

use super::field::TextValue;
use super::types::{EdgeHandle, EdgeType, NodeHandle};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Directed, typed relation between two node ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEdge {
    /// Source node id (edge goes FROM this node); empty when missing
    #[serde(default)]
    pub source: String,

    /// Target node id (edge goes TO this node)
    #[serde(default)]
    pub target: String,

    /// Relation label (e.g., "memberOf", "knows")
    #[serde(rename = "type", default)]
    pub edge_type: EdgeType,

    /// Free-text annotations
    #[serde(default)]
    pub meta: TextValue,
}

impl RawEdge {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        edge_type: impl Into<EdgeType>,
    ) -> Self {
        RawEdge {
            source: source.into(),
            target: target.into(),
            edge_type: edge_type.into(),
            meta: TextValue::default(),
        }
    }

    pub fn with_meta(mut self, meta: impl Into<TextValue>) -> Self {
        self.meta = meta.into();
        self
    }

    /// Whether the edge is a suggestion rather than an established relation
    pub fn is_proposed(&self) -> bool {
        is_proposed(&self.meta)
    }
}

pub(crate) fn is_proposed(meta: &TextValue) -> bool {
    meta.contains_ignore_case("proposed")
}

/// Identity of an edge for deduplication: `(source id, type, target id)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub source: String,
    pub edge_type: EdgeType,
    pub target: String,
}

impl EdgeKey {
    pub fn new(
        source: impl Into<String>,
        edge_type: impl Into<EdgeType>,
        target: impl Into<String>,
    ) -> Self {
        EdgeKey {
            source: source.into(),
            edge_type: edge_type.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.source, self.edge_type, self.target)
    }
}

/// Layout annotations separating parallel edges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeLayout {
    /// Signed lateral bow; 0 for a lone edge between a pair
    pub curvature: f64,
    /// Rotation of the bow plane around the chord, in radians
    pub curve_rotation: f64,
    /// Position among the parallel edges of the pair
    pub multi_index: usize,
    /// Number of parallel edges between the pair
    pub multi_count: usize,
}

impl Default for EdgeLayout {
    fn default() -> Self {
        EdgeLayout {
            curvature: 0.0,
            curve_rotation: 0.0,
            multi_index: 0,
            multi_count: 1,
        }
    }
}

/// An edge resident in the live store
#[derive(Debug, Clone, PartialEq)]
pub struct LiveEdge {
    pub handle: EdgeHandle,

    pub source: NodeHandle,

    pub target: NodeHandle,

    pub edge_type: EdgeType,

    pub meta: TextValue,

    /// Physics-engine index, unique among live edges
    pub index: u64,

    pub layout: EdgeLayout,
}

impl LiveEdge {
    pub fn new(
        handle: EdgeHandle,
        source: NodeHandle,
        target: NodeHandle,
        edge_type: impl Into<EdgeType>,
        index: u64,
    ) -> Self {
        LiveEdge {
            handle,
            source,
            target,
            edge_type: edge_type.into(),
            meta: TextValue::default(),
            index,
            layout: EdgeLayout::default(),
        }
    }

    pub fn is_proposed(&self) -> bool {
        is_proposed(&self.meta)
    }

    /// Check if this edge connects two specific nodes (in either direction)
    pub fn connects(&self, node1: NodeHandle, node2: NodeHandle) -> bool {
        (self.source == node1 && self.target == node2)
            || (self.source == node2 && self.target == node1)
    }

    /// Check if this edge touches a node at either end
    pub fn touches(&self, node: NodeHandle) -> bool {
        self.source == node || self.target == node
    }

    /// The endpoint opposite to `node`, if the edge touches it
    pub fn other_end(&self, node: NodeHandle) -> Option<NodeHandle> {
        if self.source == node {
            Some(self.target)
        } else if self.target == node {
            Some(self.source)
        } else {
            None
        }
    }
}
