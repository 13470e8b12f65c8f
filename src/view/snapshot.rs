//! Serializable snapshots of the live store for renderers and exports

use super::filter::GraphFilter;
use crate::graph::{EdgeHandle, LiveGraphStore, LiveNode, NodeHandle, NodeKind, SimState, TextValue};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderNode {
    pub handle: NodeHandle,
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(flatten)]
    pub sim: SimState,
}

/// An edge whose endpoints are resolved to live nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderLink {
    pub handle: EdgeHandle,
    pub source: NodeHandle,
    pub target: NodeHandle,
    pub source_id: String,
    pub target_id: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    pub meta: TextValue,
    pub proposed: bool,
    pub index: u64,
    pub curvature: f64,
    pub curve_rotation: f64,
    pub multi_index: usize,
    pub multi_count: usize,
}

/// `{nodes, links}` as observed by the render layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderGraph {
    pub nodes: Vec<RenderNode>,
    pub links: Vec<RenderLink>,
}

impl RenderGraph {
    /// Every live node and edge
    pub fn full(store: &LiveGraphStore) -> Self {
        Self::visible(store, &GraphFilter::default())
    }

    /// Nodes of visible types, and edges between them that the filter admits
    pub fn visible(store: &LiveGraphStore, filter: &GraphFilter) -> Self {
        let nodes: Vec<RenderNode> = store
            .nodes()
            .filter(|n| filter.is_node_visible(n))
            .map(render_node)
            .collect();
        let shown: FxHashSet<NodeHandle> = nodes.iter().map(|n| n.handle).collect();

        let links = store
            .edges()
            .filter(|e| shown.contains(&e.source) && shown.contains(&e.target))
            .filter(|e| filter.is_edge_visible(e))
            .filter_map(|e| {
                let source = store.get_node(e.source)?;
                let target = store.get_node(e.target)?;
                Some(RenderLink {
                    handle: e.handle,
                    source: e.source,
                    target: e.target,
                    source_id: source.id().to_string(),
                    target_id: target.id().to_string(),
                    edge_type: e.edge_type.to_string(),
                    meta: e.meta.clone(),
                    proposed: e.is_proposed(),
                    index: e.index,
                    curvature: e.layout.curvature,
                    curve_rotation: e.layout.curve_rotation,
                    multi_index: e.layout.multi_index,
                    multi_count: e.layout.multi_count,
                })
            })
            .collect();

        RenderGraph { nodes, links }
    }

    /// Distinct node types present, in first-seen order
    pub fn node_types(&self) -> Vec<String> {
        let mut seen = FxHashSet::default();
        self.nodes
            .iter()
            .map(|n| n.kind.to_string())
            .filter(|t| seen.insert(t.clone()))
            .collect()
    }
}

fn render_node(node: &LiveNode) -> RenderNode {
    RenderNode {
        handle: node.handle,
        id: node.id().to_string(),
        name: node.name().to_string(),
        kind: node.kind(),
        sim: node.sim,
    }
}
