//! Source-adapter output before identity resolution

use super::edge::RawEdge;
use super::field::TextValue;
use super::node::{Entity, Node};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Flat node list plus flat edge list, edges referencing nodes by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGraph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<RawEdge>,
}

/// Row describing a relation, as stored by spreadsheet and row-store sources
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipRecord {
    pub subject_url: String,
    pub object_url: String,
    /// Relation IRI; its last path segment is the edge type
    pub predicate_url: String,
    pub meta: TextValue,
}

/// Tabular export: one entity table and one relationship table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordSet {
    pub entities: Vec<Entity>,
    pub relationships: Vec<RelationshipRecord>,
}

impl RawGraph {
    pub fn new(nodes: Vec<Node>, links: Vec<RawEdge>) -> Self {
        RawGraph { nodes, links }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    /// Build a graph from tabular records
    ///
    /// Entities without a predicate cannot be addressed and are discarded.
    /// Relationships without a predicate, or whose subject or object is not a
    /// retained entity, are discarded as well.
    pub fn from_records(entities: Vec<Entity>, relationships: Vec<RelationshipRecord>) -> Self {
        let nodes: Vec<Node> = entities
            .into_iter()
            .filter(Entity::has_predicate)
            .map(Node::from_entity)
            .collect();

        let ids: FxHashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

        let links = relationships
            .into_iter()
            .filter(|r| !r.predicate_url.trim().is_empty())
            .filter(|r| ids.contains(r.subject_url.as_str()) && ids.contains(r.object_url.as_str()))
            .map(|r| {
                let edge_type = relation_type(&r.predicate_url);
                RawEdge::new(r.subject_url, r.object_url, edge_type).with_meta(r.meta)
            })
            .collect();

        RawGraph { nodes, links }
    }
}

impl From<RecordSet> for RawGraph {
    fn from(records: RecordSet) -> Self {
        RawGraph::from_records(records.entities, records.relationships)
    }
}

/// Last `/`-separated segment of a relation IRI, `relatedTo` when empty
pub fn relation_type(predicate_url: &str) -> &str {
    match predicate_url.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment,
        _ => "relatedTo",
    }
}
