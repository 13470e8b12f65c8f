//! Graph data model and the live graph store
//!
//! This module implements:
//! - Entities and canonical nodes addressed by source-qualified ids
//! - Raw (id-referencing) and live (handle-referencing) edges
//! - The source-adapter output contract, [`RawGraph`]
//! - The mutable, render-facing [`LiveGraphStore`] with change events

pub mod edge;
pub mod event;
pub mod field;
pub mod node;
pub mod raw;
pub mod store;
pub mod types;

// Re-export main types
pub use edge::{EdgeKey, EdgeLayout, LiveEdge, RawEdge};
pub use event::GraphEvent;
pub use field::TextValue;
pub use node::{Entity, LiveNode, Node, SimState, Vec3};
pub use raw::{relation_type, RawGraph, RecordSet, RelationshipRecord};
pub use store::{GraphError, GraphResult, LiveGraphStore};
pub use types::{EdgeHandle, EdgeType, NodeHandle, NodeKind};
