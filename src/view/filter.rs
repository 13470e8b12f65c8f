//! Visibility filter applied before handing the graph to a renderer

use crate::graph::{LiveEdge, LiveNode};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Which node types and which edges are shown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphFilter {
    /// Node type -> visible; types not listed are visible
    pub visible_node_types: IndexMap<String, bool>,
    pub show_proposed_edges: bool,
}

impl Default for GraphFilter {
    fn default() -> Self {
        GraphFilter {
            visible_node_types: IndexMap::new(),
            show_proposed_edges: true,
        }
    }
}

impl GraphFilter {
    /// Register node types, defaulting unseen ones to visible
    pub fn ensure_node_types<I, S>(&mut self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for t in types {
            self.visible_node_types
                .entry(t.as_ref().to_string())
                .or_insert(true);
        }
    }

    pub fn toggle_node_type(&mut self, node_type: &str) {
        let visible = self.is_type_visible(node_type);
        self.visible_node_types.insert(node_type.to_string(), !visible);
    }

    pub fn set_node_type_visibility(&mut self, node_type: &str, visible: bool) {
        self.visible_node_types.insert(node_type.to_string(), visible);
    }

    pub fn set_show_proposed_edges(&mut self, show: bool) {
        self.show_proposed_edges = show;
    }

    pub fn is_type_visible(&self, node_type: &str) -> bool {
        self.visible_node_types.get(node_type).copied().unwrap_or(true)
    }

    pub fn is_node_visible(&self, node: &LiveNode) -> bool {
        self.is_type_visible(node.kind().as_str())
    }

    /// Edge-level check; endpoint visibility is decided by the caller
    pub fn is_edge_visible(&self, edge: &LiveEdge) -> bool {
        self.show_proposed_edges || !edge.is_proposed()
    }
}
