//! Identity resolution across sources
//!
//! Two steps decide which raw entities denote the same real-world node:
//! - [`resolve_sources`] unions the per-source graphs by canonical id (first
//!   occurrence wins) and drops edges whose endpoints did not survive.
//! - An [`IdentityResolver`] maps a node to its identity key. Nodes sharing a
//!   key collapse into one canonical node during the merge; the first-seen
//!   (or already live) node is canonical and its fields are kept.
//!
//! Identity is currently the exact `name`. The resolver is a trait so that a
//! normalized or table-driven identity can replace it without touching the
//! merge engine.

use crate::graph::{Node, RawGraph};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Maps a node to the key that decides its real-world identity
pub trait IdentityResolver: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn identity<'a>(&self, node: &'a Node) -> Cow<'a, str>;
}

/// Nodes with byte-identical names are the same node
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactName;

impl IdentityResolver for ExactName {
    fn name(&self) -> &str {
        "exact"
    }

    fn identity<'a>(&self, node: &'a Node) -> Cow<'a, str> {
        Cow::Borrowed(node.name())
    }
}

/// Names compared case-insensitively with whitespace runs collapsed
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedName;

impl IdentityResolver for NormalizedName {
    fn name(&self) -> &str {
        "normalized"
    }

    fn identity<'a>(&self, node: &'a Node) -> Cow<'a, str> {
        let normalized = node
            .name()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if normalized == node.name() {
            Cow::Borrowed(node.name())
        } else {
            Cow::Owned(normalized)
        }
    }
}

/// Identity strategy selectable from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityMode {
    #[default]
    Exact,
    Normalized,
}

impl IdentityMode {
    pub fn resolver(self) -> Arc<dyn IdentityResolver> {
        match self {
            IdentityMode::Exact => Arc::new(ExactName),
            IdentityMode::Normalized => Arc::new(NormalizedName),
        }
    }
}

/// Combine per-source graphs into one candidate graph
///
/// Nodes without an id cannot be addressed and are discarded. The rest are
/// unioned by id; the first occurrence of an id wins and later ones are
/// ignored. An edge is kept when both of its endpoint ids are among
/// the combined nodes, otherwise it is dropped silently. Nodes sharing a name
/// under different ids are all kept here: collapsing them is the merge
/// engine's job, so that their edges can be remapped onto the canonical node.
pub fn resolve_sources<'a, I>(graphs: I) -> RawGraph
where
    I: IntoIterator<Item = &'a RawGraph>,
{
    let graphs: Vec<&RawGraph> = graphs.into_iter().collect();

    let mut nodes: IndexMap<&str, &Node> = IndexMap::new();
    let mut anonymous = 0usize;
    for graph in &graphs {
        for node in &graph.nodes {
            if !node.has_id() {
                anonymous += 1;
                continue;
            }
            nodes.entry(node.id.as_str()).or_insert(node);
        }
    }

    let ids: FxHashSet<&str> = nodes.keys().copied().collect();
    let mut dropped = 0usize;
    let links = graphs
        .iter()
        .flat_map(|g| g.links.iter())
        .filter(|l| {
            let keep = ids.contains(l.source.as_str()) && ids.contains(l.target.as_str());
            if !keep {
                dropped += 1;
            }
            keep
        })
        .cloned()
        .collect::<Vec<_>>();

    debug!(
        sources = graphs.len(),
        nodes = nodes.len(),
        links = links.len(),
        anonymous,
        dropped,
        "resolved source graphs"
    );

    RawGraph {
        nodes: nodes.into_values().cloned().collect(),
        links,
    }
}
