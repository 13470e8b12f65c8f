//! Graph events for change observers
//!
//! Captures mutations of the live store so renderers and indexers can follow
//! the graph without diffing snapshots.

use super::types::{EdgeHandle, EdgeType, NodeHandle};

#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    NodeAdded {
        handle: NodeHandle,
        id: String,
    },
    NodeRemoved {
        handle: NodeHandle,
        id: String,
    },
    EdgeAdded {
        handle: EdgeHandle,
        source: NodeHandle,
        target: NodeHandle,
        edge_type: EdgeType,
    },
    EdgeRemoved {
        handle: EdgeHandle,
        source: NodeHandle,
        target: NodeHandle,
        edge_type: EdgeType,
    },
}
