//! Entities, canonical nodes and live nodes
//!
//! An [`Entity`] is what a source reports about a person, project or
//! organization. A [`Node`] is an entity addressed by a canonical id. A
//! [`LiveNode`] is a node placed in the live store, carrying the physics
//! state the renderer's simulation attaches to it.

use super::field::TextValue;
use super::types::{NodeHandle, NodeKind};
use serde::{Deserialize, Serialize};

/// Source-provided description of a real-world entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entity {
    /// Source-scoped identifier (e.g. `"person://jane_doe"`)
    pub predicate: String,

    /// Display name; also the identity key for cross-source deduplication
    pub name: String,

    pub primary_url: String,

    pub description: TextValue,

    pub images: TextValue,

    pub urls: TextValue,

    pub country_name: String,

    /// `"lat,lon"` as reported by the source
    pub geolocation: String,
}

impl Entity {
    pub fn new(predicate: impl Into<String>, name: impl Into<String>) -> Self {
        Entity {
            predicate: predicate.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Whether this entity carries an identity predicate at all
    pub fn has_predicate(&self) -> bool {
        !self.predicate.trim().is_empty()
    }
}

/// An entity addressed by its canonical id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Canonical identity key, `"<scheme>:" + rest`; empty when the source
    /// omitted it
    #[serde(default)]
    pub id: String,

    #[serde(flatten)]
    pub entity: Entity,
}

impl Node {
    /// Create a node with only an id and a name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        Node {
            entity: Entity::new(id.clone(), name),
            id,
        }
    }

    /// Wrap an entity, using its predicate as the canonical id
    pub fn from_entity(entity: Entity) -> Self {
        Node {
            id: entity.predicate.clone(),
            entity,
        }
    }

    pub fn name(&self) -> &str {
        &self.entity.name
    }

    /// Whether the node carries a usable canonical id
    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// Coarse type derived from the id's scheme
    pub fn kind(&self) -> NodeKind {
        NodeKind::from_id(&self.id)
    }
}

/// 3-component vector used for simulation coordinates
pub type Vec3 = [f64; 3];

/// Simulation state owned by the force layout, never reset by a merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimState {
    pub position: Option<Vec3>,
    pub velocity: Option<Vec3>,
    /// Fixed coordinates; a pinned node ignores forces
    pub pinned: Option<Vec3>,
}

impl SimState {
    pub fn is_pinned(&self) -> bool {
        self.pinned.is_some()
    }
}

/// A node resident in the live store
#[derive(Debug, Clone, PartialEq)]
pub struct LiveNode {
    pub handle: NodeHandle,
    pub node: Node,
    pub sim: SimState,
}

impl LiveNode {
    pub fn new(handle: NodeHandle, node: Node) -> Self {
        LiveNode {
            handle,
            node,
            sim: SimState::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.node.id
    }

    pub fn name(&self) -> &str {
        self.node.name()
    }

    pub fn kind(&self) -> NodeKind {
        self.node.kind()
    }
}
