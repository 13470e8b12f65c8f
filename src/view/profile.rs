//! Profile of a focused node and its neighbourhood

use crate::graph::{LiveGraphStore, NodeHandle};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileLink {
    pub label: String,
    pub href: String,
}

/// A neighbour of the focused node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub handle: NodeHandle,
    pub name: String,
    pub image: String,
}

/// What a side panel shows for a selected node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeProfile {
    pub id: String,
    pub name: String,
    pub title: String,
    pub image: String,
    pub location: String,
    pub links: Vec<ProfileLink>,
    pub relationships: Vec<Relationship>,
}

impl NodeProfile {
    /// Build the profile of a live node, `None` if the handle is not live
    ///
    /// Edges in either direction to the same neighbour collapse into a
    /// single relationship.
    pub fn build(store: &LiveGraphStore, handle: NodeHandle) -> Option<Self> {
        let focused = store.get_node(handle)?;
        let entity = &focused.node.entity;

        let mut neighbours: IndexMap<NodeHandle, Relationship> = IndexMap::new();
        for edge_handle in store.incident_edge_handles(handle) {
            let Some(other) = store
                .get_edge(edge_handle)
                .and_then(|e| e.other_end(handle))
                .and_then(|h| store.get_node(h))
            else {
                continue;
            };
            neighbours.entry(other.handle).or_insert_with(|| Relationship {
                handle: other.handle,
                name: other.name().to_string(),
                image: other.node.entity.images.first().unwrap_or_default().to_string(),
            });
        }

        Some(NodeProfile {
            id: focused.id().to_string(),
            name: focused.name().to_string(),
            title: entity.description.join(","),
            image: entity.images.first().unwrap_or_default().to_string(),
            location: entity.geolocation.clone(),
            links: entity
                .urls
                .to_vec()
                .into_iter()
                .map(|url| ProfileLink {
                    label: url.clone(),
                    href: url,
                })
                .collect(),
            relationships: neighbours.into_values().collect(),
        })
    }
}
