//! Commons Graph
//!
//! A federated knowledge-graph merge engine. Several community datasets each
//! describe people, projects and organizations; this crate unifies them into
//! one live graph that a force-directed view can keep simulating while
//! sources are toggled on and off.
//!
//! # Architecture
//!
//! - [`sources`]: adapters producing a [`RawGraph`] per dataset
//! - [`resolve`]: unions per-source graphs and decides node identity
//! - [`merge`]: reconciles a candidate graph into the [`LiveGraphStore`] in
//!   place and lays out parallel edges
//! - [`session`]: concurrent fetch cycles with cancellation and change
//!   notification
//! - [`view`]: filtered render snapshots and node profiles
//! - [`config`]: YAML configuration and the source catalog
//!
//! # Guarantees
//!
//! - Node ids are unique in the live store and every edge refers to live nodes
//! - At most one live edge exists per `(source id, type, target id)`
//! - Nodes and edges that survive a merge keep their handle and simulation
//!   state
//!
//! ## Example Usage
//!
//! ```rust
//! use commons_graph::{LiveGraphStore, MergeEngine, MultiEdgeLayout, Node, RawEdge, RawGraph};
//!
//! let candidate = RawGraph::new(
//!     vec![Node::new("person:alice", "Alice"), Node::new("organization:acme", "Acme")],
//!     vec![RawEdge::new("person:alice", "organization:acme", "memberOf")],
//! );
//!
//! let mut store = LiveGraphStore::new();
//! let report = MergeEngine::new().merge(&mut store, &candidate);
//! MultiEdgeLayout::default().apply(&mut store);
//!
//! assert_eq!(report.nodes_added, 2);
//! assert_eq!(store.edge_count(), 1);
//!
//! // Merging the same graph again changes nothing
//! assert!(MergeEngine::new().merge(&mut store, &candidate).is_noop());
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod graph;
pub mod merge;
pub mod resolve;
pub mod session;
pub mod sources;
pub mod view;

// Re-export main types for convenience
pub use graph::{
    EdgeHandle, EdgeKey, EdgeLayout, EdgeType, Entity, GraphError, GraphEvent, GraphResult,
    LiveEdge, LiveGraphStore, LiveNode, Node, NodeHandle, NodeKind, RawEdge, RawGraph, RecordSet,
    RelationshipRecord, SimState, TextValue,
};

pub use resolve::{resolve_sources, ExactName, IdentityMode, IdentityResolver, NormalizedName};

pub use merge::{MergeEngine, MergeReport, MultiEdgeLayout};

pub use session::{CancelFlag, CycleSummary, GraphRevision, GraphSession, SharedStore};

pub use sources::{
    DataSource, EmptySource, JsonFileSource, SourceError, SourceFormat, SourceRegistry,
    SourceResult, StaticSource,
};

pub use view::{GraphFilter, NodeProfile, RenderGraph};

pub use config::{ConfigError, ConfigResult, GraphConfig, LayoutConfig, SourceConfig};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
