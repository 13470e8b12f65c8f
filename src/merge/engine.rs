//! Incremental merge of a candidate graph into the live store
//!
//! The store is reconciled in place: surviving nodes and edges keep their
//! handles (and with them any simulation state), nodes and edges the
//! candidate no longer justifies are removed, and genuinely new ones are
//! appended. The merge never fails; anything it cannot resolve is skipped.

use crate::graph::{EdgeKey, LiveGraphStore, NodeHandle, RawEdge, RawGraph};
use crate::resolve::{ExactName, IdentityResolver};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Counts describing one merge pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    pub nodes_added: usize,
    pub nodes_removed: usize,
    pub edges_added: usize,
    pub edges_removed: usize,
    /// Candidate edges that failed to remap or repeated a triple
    pub edges_dropped: usize,
}

impl MergeReport {
    /// True when the pass left the store untouched
    pub fn is_noop(&self) -> bool {
        self.nodes_added == 0
            && self.nodes_removed == 0
            && self.edges_added == 0
            && self.edges_removed == 0
    }
}

/// Where the canonical node for an identity key lives
#[derive(Debug, Clone, Copy)]
enum Canonical {
    /// Already in the store
    Live(NodeHandle),
    /// Candidate node at this position, to be appended
    Pending(usize),
}

/// Reconciles candidate graphs against a live store
#[derive(Debug, Clone)]
pub struct MergeEngine {
    resolver: Arc<dyn IdentityResolver>,
}

impl Default for MergeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeEngine {
    /// Engine using exact-name identity
    pub fn new() -> Self {
        Self::with_resolver(Arc::new(ExactName))
    }

    pub fn with_resolver(resolver: Arc<dyn IdentityResolver>) -> Self {
        MergeEngine { resolver }
    }

    pub fn resolver(&self) -> &dyn IdentityResolver {
        self.resolver.as_ref()
    }

    /// Reconcile `candidate` into `store`
    ///
    /// Candidate nodes without an id are skipped, and so are edges to them.
    ///
    /// 1. Index live nodes by identity key; the first live node per key is
    ///    canonical.
    /// 2. Each candidate node either maps onto its key's canonical node or
    ///    becomes canonical itself and is scheduled for addition.
    /// 3. Live nodes whose id is not canonical for any candidate node are
    ///    removed, along with their edges.
    /// 4. Scheduled nodes are appended.
    /// 5. Candidate edges are remapped to canonical nodes; edges that fail to
    ///    remap on either end are dropped.
    /// 6. Remapped edges are deduplicated by `(source id, type, target id)`.
    /// 7. Live edges whose triple is not among them are removed, then the new
    ///    triples are appended with fresh physics indices.
    pub fn merge(&self, store: &mut LiveGraphStore, candidate: &RawGraph) -> MergeReport {
        let mut report = MergeReport::default();

        let mut canonical: FxHashMap<String, Canonical> = FxHashMap::default();
        for node in store.nodes() {
            let key = self.resolver.identity(&node.node).into_owned();
            canonical.entry(key).or_insert(Canonical::Live(node.handle));
        }

        // Canonical ids justified by the candidate
        let mut seen: FxHashSet<String> = FxHashSet::default();
        // Candidate ids scheduled for addition, first position wins
        let mut pending_ids: FxHashMap<&str, usize> = FxHashMap::default();
        let mut pending: Vec<usize> = Vec::new();

        for (pos, node) in candidate.nodes.iter().enumerate() {
            if !node.has_id() {
                continue;
            }
            let key = self.resolver.identity(node);
            if let Some(existing) = canonical.get(key.as_ref()) {
                let id = match *existing {
                    Canonical::Live(handle) => store.get_node(handle).map(|n| n.id().to_string()),
                    Canonical::Pending(p) => Some(candidate.nodes[p].id.clone()),
                };
                seen.extend(id);
                continue;
            }

            let entry = if let Some(handle) = store.node_handle(&node.id) {
                // Same id live under another identity key; the live node stays
                Canonical::Live(handle)
            } else if let Some(&p) = pending_ids.get(node.id.as_str()) {
                Canonical::Pending(p)
            } else {
                pending_ids.insert(node.id.as_str(), pos);
                pending.push(pos);
                Canonical::Pending(pos)
            };
            seen.insert(node.id.clone());
            canonical.insert(key.into_owned(), entry);
        }

        let stale: Vec<NodeHandle> = store
            .nodes()
            .filter(|n| !seen.contains(n.id()))
            .map(|n| n.handle)
            .collect();
        let edges_before = store.edge_count();
        report.nodes_removed = store.remove_nodes(&stale);
        report.edges_removed += edges_before - store.edge_count();

        let mut appended: FxHashMap<usize, NodeHandle> = FxHashMap::default();
        for pos in pending {
            if let Ok(handle) = store.insert_node(candidate.nodes[pos].clone()) {
                appended.insert(pos, handle);
                report.nodes_added += 1;
            }
        }

        let positions = raw_positions(candidate);
        let lookup = |raw_id: &str| -> Option<NodeHandle> {
            let pos = *positions.get(raw_id)?;
            let key = self.resolver.identity(&candidate.nodes[pos]);
            match *canonical.get(key.as_ref())? {
                Canonical::Live(handle) => Some(handle),
                Canonical::Pending(p) => appended.get(&p).copied(),
            }
        };

        let mut wanted: FxHashSet<EdgeKey> = FxHashSet::default();
        let mut additions: Vec<(NodeHandle, NodeHandle, &RawEdge)> = Vec::new();
        for link in &candidate.links {
            let (Some(source), Some(target)) = (lookup(&link.source), lookup(&link.target)) else {
                report.edges_dropped += 1;
                continue;
            };
            let (Some(source_node), Some(target_node)) = (store.get_node(source), store.get_node(target))
            else {
                report.edges_dropped += 1;
                continue;
            };

            let key = EdgeKey::new(source_node.id(), link.edge_type.clone(), target_node.id());
            if wanted.contains(&key) {
                report.edges_dropped += 1;
                continue;
            }
            if !store.has_edge_key(&key) {
                additions.push((source, target, link));
            }
            wanted.insert(key);
        }

        let obsolete: Vec<_> = store
            .edges()
            .filter(|e| store.edge_key(e).map_or(true, |k| !wanted.contains(&k)))
            .map(|e| e.handle)
            .collect();
        report.edges_removed += store.remove_edges(&obsolete);

        for (source, target, link) in additions {
            if store
                .insert_edge(source, target, link.edge_type.clone(), link.meta.clone())
                .is_ok()
            {
                report.edges_added += 1;
            }
        }

        debug!(
            resolver = self.resolver.name(),
            nodes = store.node_count(),
            edges = store.edge_count(),
            ?report,
            "merged candidate graph"
        );
        report
    }
}

/// Position of the first candidate node carrying each raw id
fn raw_positions(candidate: &RawGraph) -> FxHashMap<&str, usize> {
    let mut positions = FxHashMap::default();
    for (pos, node) in candidate.nodes.iter().enumerate().filter(|(_, n)| n.has_id()) {
        positions.entry(node.id.as_str()).or_insert(pos);
    }
    positions
}
