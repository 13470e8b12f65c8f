//! Live graph storage
//!
//! The render-facing graph that merge passes mutate in place. Nodes and edges
//! live in insertion-ordered arenas keyed by stable handles: a surviving
//! entity keeps its slot (and so its simulation state) across merges, removal
//! preserves the order of the remaining entries, and additions append.

use super::edge::{EdgeKey, LiveEdge};
use super::event::GraphEvent;
use super::field::TextValue;
use super::node::{LiveNode, Node};
use super::types::{EdgeHandle, EdgeType, NodeHandle};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Errors that can occur during store operations
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeHandle),

    #[error("Edge {0} not found")]
    EdgeNotFound(EdgeHandle),

    #[error("Node with id {0} already exists")]
    NodeAlreadyExists(String),

    #[error("Edge {0} already exists")]
    EdgeAlreadyExists(EdgeKey),

    #[error("Invalid edge: source node {0} does not exist")]
    InvalidEdgeSource(NodeHandle),

    #[error("Invalid edge: target node {0} does not exist")]
    InvalidEdgeTarget(NodeHandle),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Mutable node/edge arenas driving the visualization
///
/// Indices kept alongside the arenas:
/// - id_index: canonical id -> NodeHandle (ids are unique)
/// - key_index: (source id, type, target id) -> EdgeHandle (triples are unique)
/// - outgoing / incoming: adjacency lists per node
#[derive(Debug, Default)]
pub struct LiveGraphStore {
    nodes: IndexMap<NodeHandle, LiveNode>,

    edges: IndexMap<EdgeHandle, LiveEdge>,

    outgoing: FxHashMap<NodeHandle, Vec<EdgeHandle>>,

    incoming: FxHashMap<NodeHandle, Vec<EdgeHandle>>,

    id_index: FxHashMap<String, NodeHandle>,

    key_index: FxHashMap<EdgeKey, EdgeHandle>,

    /// Change event sender
    event_sender: Option<UnboundedSender<GraphEvent>>,

    next_node_handle: u64,

    next_edge_handle: u64,

    /// Next physics index; always above every index handed out so far
    next_edge_index: u64,
}

impl LiveGraphStore {
    /// Create a new empty store
    pub fn new() -> Self {
        LiveGraphStore {
            next_node_handle: 1,
            next_edge_handle: 1,
            ..Default::default()
        }
    }

    /// Create a store that streams every mutation as a [`GraphEvent`]
    pub fn with_events() -> (Self, UnboundedReceiver<GraphEvent>) {
        let (tx, rx) = unbounded_channel();
        let mut store = Self::new();
        store.event_sender = Some(tx);
        (store, rx)
    }

    fn emit(&self, event: GraphEvent) {
        if let Some(sender) = &self.event_sender {
            // A dropped receiver only means nobody is listening anymore
            let _ = sender.send(event);
        }
    }

    /// Append a node; its id must not be live already
    pub fn insert_node(&mut self, node: Node) -> GraphResult<NodeHandle> {
        if self.id_index.contains_key(&node.id) {
            return Err(GraphError::NodeAlreadyExists(node.id));
        }

        let handle = NodeHandle::new(self.next_node_handle);
        self.next_node_handle += 1;

        self.id_index.insert(node.id.clone(), handle);
        self.emit(GraphEvent::NodeAdded {
            handle,
            id: node.id.clone(),
        });
        self.nodes.insert(handle, LiveNode::new(handle, node));
        Ok(handle)
    }

    pub fn get_node(&self, handle: NodeHandle) -> Option<&LiveNode> {
        self.nodes.get(&handle)
    }

    /// Mutable access, e.g. for the simulation to write positions
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut LiveNode> {
        self.nodes.get_mut(&handle)
    }

    pub fn has_node(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(&handle)
    }

    /// Look up the handle of a live node by canonical id
    pub fn node_handle(&self, id: &str) -> Option<NodeHandle> {
        self.id_index.get(id).copied()
    }

    pub fn node_by_id(&self, id: &str) -> Option<&LiveNode> {
        self.node_handle(id).and_then(|h| self.get_node(h))
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.id_index.contains_key(id)
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&mut self, handle: NodeHandle) -> GraphResult<LiveNode> {
        if !self.has_node(handle) {
            return Err(GraphError::NodeNotFound(handle));
        }
        let incident = self.incident_edge_handles(handle);
        self.remove_edges(&incident);

        let node = self
            .nodes
            .shift_remove(&handle)
            .ok_or(GraphError::NodeNotFound(handle))?;
        self.detach_node(&node);
        Ok(node)
    }

    /// Remove a batch of nodes (and their edges) in one order-preserving pass
    ///
    /// Unknown handles are ignored. Returns the number of nodes removed.
    pub fn remove_nodes(&mut self, handles: &[NodeHandle]) -> usize {
        let doomed: FxHashSet<NodeHandle> = handles
            .iter()
            .copied()
            .filter(|h| self.has_node(*h))
            .collect();
        if doomed.is_empty() {
            return 0;
        }

        let incident: Vec<EdgeHandle> = doomed
            .iter()
            .flat_map(|h| self.incident_edge_handles(*h))
            .collect();
        self.remove_edges(&incident);

        let mut removed = Vec::with_capacity(doomed.len());
        self.nodes.retain(|handle, node| {
            if doomed.contains(handle) {
                removed.push(node.clone());
                false
            } else {
                true
            }
        });
        for node in &removed {
            self.detach_node(node);
        }
        removed.len()
    }

    fn detach_node(&mut self, node: &LiveNode) {
        self.id_index.remove(node.id());
        self.outgoing.remove(&node.handle);
        self.incoming.remove(&node.handle);
        self.emit(GraphEvent::NodeRemoved {
            handle: node.handle,
            id: node.id().to_string(),
        });
    }

    /// Create an edge between two live nodes
    ///
    /// The edge receives the next physics index. Fails if either endpoint is
    /// missing or the `(source id, type, target id)` triple is already live.
    pub fn insert_edge(
        &mut self,
        source: NodeHandle,
        target: NodeHandle,
        edge_type: impl Into<EdgeType>,
        meta: TextValue,
    ) -> GraphResult<EdgeHandle> {
        let source_id = self
            .get_node(source)
            .ok_or(GraphError::InvalidEdgeSource(source))?
            .id()
            .to_string();
        let target_id = self
            .get_node(target)
            .ok_or(GraphError::InvalidEdgeTarget(target))?
            .id()
            .to_string();

        let edge_type = edge_type.into();
        let key = EdgeKey::new(source_id, edge_type.clone(), target_id);
        if self.key_index.contains_key(&key) {
            return Err(GraphError::EdgeAlreadyExists(key));
        }

        let handle = EdgeHandle::new(self.next_edge_handle);
        self.next_edge_handle += 1;
        let index = self.next_edge_index;
        self.next_edge_index += 1;

        let mut edge = LiveEdge::new(handle, source, target, edge_type.clone(), index);
        edge.meta = meta;

        self.outgoing.entry(source).or_default().push(handle);
        self.incoming.entry(target).or_default().push(handle);
        self.key_index.insert(key, handle);
        self.emit(GraphEvent::EdgeAdded {
            handle,
            source,
            target,
            edge_type,
        });
        self.edges.insert(handle, edge);
        Ok(handle)
    }

    pub fn get_edge(&self, handle: EdgeHandle) -> Option<&LiveEdge> {
        self.edges.get(&handle)
    }

    pub fn get_edge_mut(&mut self, handle: EdgeHandle) -> Option<&mut LiveEdge> {
        self.edges.get_mut(&handle)
    }

    pub fn has_edge(&self, handle: EdgeHandle) -> bool {
        self.edges.contains_key(&handle)
    }

    pub fn edge_handle(&self, key: &EdgeKey) -> Option<EdgeHandle> {
        self.key_index.get(key).copied()
    }

    pub fn has_edge_key(&self, key: &EdgeKey) -> bool {
        self.key_index.contains_key(key)
    }

    /// Dedup key of a live edge, resolved through its endpoints' ids
    pub fn edge_key(&self, edge: &LiveEdge) -> Option<EdgeKey> {
        let source = self.get_node(edge.source)?;
        let target = self.get_node(edge.target)?;
        Some(EdgeKey::new(
            source.id(),
            edge.edge_type.clone(),
            target.id(),
        ))
    }

    /// Delete an edge
    pub fn remove_edge(&mut self, handle: EdgeHandle) -> GraphResult<LiveEdge> {
        let edge = self
            .edges
            .shift_remove(&handle)
            .ok_or(GraphError::EdgeNotFound(handle))?;
        self.detach_edge(&edge);
        Ok(edge)
    }

    /// Remove a batch of edges in one order-preserving pass
    ///
    /// Unknown handles are ignored. Returns the number of edges removed.
    pub fn remove_edges(&mut self, handles: &[EdgeHandle]) -> usize {
        let doomed: FxHashSet<EdgeHandle> = handles.iter().copied().collect();
        if doomed.is_empty() {
            return 0;
        }

        let mut removed = Vec::new();
        self.edges.retain(|handle, edge| {
            if doomed.contains(handle) {
                removed.push(edge.clone());
                false
            } else {
                true
            }
        });
        for edge in &removed {
            self.detach_edge(edge);
        }
        removed.len()
    }

    fn detach_edge(&mut self, edge: &LiveEdge) {
        match self.edge_key(edge) {
            Some(key) => {
                self.key_index.remove(&key);
            }
            None => self.key_index.retain(|_, h| *h != edge.handle),
        }

        if let Some(adj) = self.outgoing.get_mut(&edge.source) {
            adj.retain(|&h| h != edge.handle);
        }
        if let Some(adj) = self.incoming.get_mut(&edge.target) {
            adj.retain(|&h| h != edge.handle);
        }

        self.emit(GraphEvent::EdgeRemoved {
            handle: edge.handle,
            source: edge.source,
            target: edge.target,
            edge_type: edge.edge_type.clone(),
        });
    }

    /// Get all outgoing edges from a node
    pub fn get_outgoing_edges(&self, handle: NodeHandle) -> Vec<&LiveEdge> {
        self.outgoing
            .get(&handle)
            .map(|edges| edges.iter().filter_map(|&h| self.get_edge(h)).collect())
            .unwrap_or_default()
    }

    /// Get all incoming edges to a node
    pub fn get_incoming_edges(&self, handle: NodeHandle) -> Vec<&LiveEdge> {
        self.incoming
            .get(&handle)
            .map(|edges| edges.iter().filter_map(|&h| self.get_edge(h)).collect())
            .unwrap_or_default()
    }

    /// Handles of every edge touching a node, self-loops listed once
    pub fn incident_edge_handles(&self, handle: NodeHandle) -> Vec<EdgeHandle> {
        let mut seen = FxHashSet::default();
        self.outgoing
            .get(&handle)
            .into_iter()
            .chain(self.incoming.get(&handle))
            .flatten()
            .copied()
            .filter(|h| seen.insert(*h))
            .collect()
    }

    /// Live nodes in array order
    pub fn nodes(&self) -> impl Iterator<Item = &LiveNode> {
        self.nodes.values()
    }

    /// Live edges in array order
    pub fn edges(&self) -> impl Iterator<Item = &LiveEdge> {
        self.edges.values()
    }

    pub fn edges_mut(&mut self) -> impl Iterator<Item = &mut LiveEdge> {
        self.edges.values_mut()
    }

    pub fn node_handles(&self) -> Vec<NodeHandle> {
        self.nodes.keys().copied().collect()
    }

    pub fn edge_handles(&self) -> Vec<EdgeHandle> {
        self.edges.keys().copied().collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Physics index the next inserted edge will receive
    pub fn next_edge_index(&self) -> u64 {
        self.next_edge_index
    }

    /// Drop all nodes and edges; handles and edge indices are not reused
    pub fn clear(&mut self) {
        let handles = self.node_handles();
        self.remove_nodes(&handles);
    }

    /// Verify the structural invariants of the store
    ///
    /// Node ids are unique, every edge references live nodes, edge triples
    /// are unique, physics indices are unique, and the indices agree with the
    /// arenas.
    pub fn check_invariants(&self) -> GraphResult<()> {
        let violation = |msg: String| Err(GraphError::InvariantViolation(msg));

        if self.id_index.len() != self.nodes.len() {
            return violation(format!(
                "{} ids indexed for {} nodes",
                self.id_index.len(),
                self.nodes.len()
            ));
        }
        for node in self.nodes.values() {
            if self.id_index.get(node.id()) != Some(&node.handle) {
                return violation(format!("id {} does not resolve to {}", node.id(), node.handle));
            }
        }

        let mut keys = FxHashSet::default();
        let mut indices = FxHashSet::default();
        for edge in self.edges.values() {
            let Some(key) = self.edge_key(edge) else {
                return violation(format!("edge {} references a missing node", edge.handle));
            };
            if self.key_index.get(&key) != Some(&edge.handle) {
                return violation(format!("edge {} is not indexed under {}", edge.handle, key));
            }
            if !keys.insert(key.clone()) {
                return violation(format!("duplicate edge {}", key));
            }
            if !indices.insert(edge.index) {
                return violation(format!("duplicate edge index {}", edge.index));
            }
        }
        if self.key_index.len() != self.edges.len() {
            return violation(format!(
                "{} edge keys indexed for {} edges",
                self.key_index.len(),
                self.edges.len()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(ids: &[&str]) -> (LiveGraphStore, Vec<NodeHandle>) {
        let mut store = LiveGraphStore::new();
        let handles = ids
            .iter()
            .map(|id| store.insert_node(Node::new(*id, id.to_uppercase())).unwrap())
            .collect();
        (store, handles)
    }

    #[test]
    fn test_insert_and_get_node() {
        let (store, handles) = store_with(&["person:alice"]);

        assert_eq!(store.node_count(), 1);
        let node = store.get_node(handles[0]).unwrap();
        assert_eq!(node.handle, handles[0]);
        assert_eq!(store.node_handle("person:alice"), Some(handles[0]));
        assert!(store.node_by_id("person:bob").is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let (mut store, _) = store_with(&["person:alice"]);
        let result = store.insert_node(Node::new("person:alice", "Other Alice"));
        assert_eq!(
            result,
            Err(GraphError::NodeAlreadyExists("person:alice".to_string()))
        );
        assert_eq!(store.node_count(), 1);
    }

    #[test]
    fn test_insert_and_get_edge() {
        let (mut store, h) = store_with(&["person:a", "person:b"]);
        let edge = store.insert_edge(h[0], h[1], "knows", TextValue::default()).unwrap();

        assert_eq!(store.edge_count(), 1);
        let live = store.get_edge(edge).unwrap();
        assert_eq!(live.source, h[0]);
        assert_eq!(live.target, h[1]);
        assert_eq!(live.index, 0);
        assert!(store.has_edge_key(&EdgeKey::new("person:a", "knows", "person:b")));
    }

    #[test]
    fn test_edge_validation() {
        let (mut store, h) = store_with(&["person:a"]);
        let invalid = NodeHandle::new(999);

        let result = store.insert_edge(invalid, h[0], "knows", TextValue::default());
        assert_eq!(result, Err(GraphError::InvalidEdgeSource(invalid)));

        let result = store.insert_edge(h[0], invalid, "knows", TextValue::default());
        assert_eq!(result, Err(GraphError::InvalidEdgeTarget(invalid)));
    }

    #[test]
    fn test_duplicate_triple_rejected() {
        let (mut store, h) = store_with(&["person:a", "person:b"]);
        store.insert_edge(h[0], h[1], "knows", TextValue::default()).unwrap();

        let dup = store.insert_edge(h[0], h[1], "knows", "again".into());
        assert!(matches!(dup, Err(GraphError::EdgeAlreadyExists(_))));

        // Reverse direction and other types are distinct triples
        store.insert_edge(h[1], h[0], "knows", TextValue::default()).unwrap();
        store.insert_edge(h[0], h[1], "maintainer", TextValue::default()).unwrap();
        assert_eq!(store.edge_count(), 3);
    }

    #[test]
    fn test_adjacency_lists() {
        let (mut store, h) = store_with(&["person:a", "person:b", "person:c"]);
        store.insert_edge(h[0], h[1], "knows", TextValue::default()).unwrap();
        store.insert_edge(h[0], h[2], "knows", TextValue::default()).unwrap();
        store.insert_edge(h[1], h[2], "knows", TextValue::default()).unwrap();

        assert_eq!(store.get_outgoing_edges(h[0]).len(), 2);
        assert_eq!(store.get_incoming_edges(h[2]).len(), 2);
        assert_eq!(store.incident_edge_handles(h[1]).len(), 2);
    }

    #[test]
    fn test_remove_node_cascades_edges() {
        let (mut store, h) = store_with(&["person:a", "person:b", "person:c"]);
        store.insert_edge(h[0], h[1], "knows", TextValue::default()).unwrap();
        store.insert_edge(h[1], h[2], "knows", TextValue::default()).unwrap();
        store.insert_edge(h[1], h[1], "knows", TextValue::default()).unwrap();

        let removed = store.remove_node(h[1]).unwrap();
        assert_eq!(removed.id(), "person:b");
        assert_eq!(store.node_count(), 2);
        assert_eq!(store.edge_count(), 0);
        assert!(!store.contains_id("person:b"));
        store.check_invariants().unwrap();

        assert_eq!(store.remove_node(h[1]), Err(GraphError::NodeNotFound(h[1])));
    }

    #[test]
    fn test_remove_preserves_order() {
        let (mut store, h) = store_with(&["person:a", "person:b", "person:c", "person:d"]);
        assert_eq!(store.remove_nodes(&[h[1], h[3], NodeHandle::new(77)]), 2);

        let ids: Vec<&str> = store.nodes().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["person:a", "person:c"]);
    }

    #[test]
    fn test_handles_and_indices_not_reused() {
        let (mut store, h) = store_with(&["person:a", "person:b"]);
        let e1 = store.insert_edge(h[0], h[1], "knows", TextValue::default()).unwrap();
        store.remove_edge(e1).unwrap();
        let e2 = store.insert_edge(h[0], h[1], "knows", TextValue::default()).unwrap();

        assert_ne!(e1, e2);
        assert_eq!(store.get_edge(e2).unwrap().index, 1);
        assert_eq!(store.next_edge_index(), 2);

        store.remove_node(h[0]).unwrap();
        let again = store.insert_node(Node::new("person:a", "A")).unwrap();
        assert_ne!(again, h[0]);
    }

    #[test]
    fn test_simulation_state_is_writable() {
        let (mut store, h) = store_with(&["person:a"]);
        store.get_node_mut(h[0]).unwrap().sim.position = Some([1.0, 2.0, 3.0]);
        assert_eq!(store.get_node(h[0]).unwrap().sim.position, Some([1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_events_stream() {
        let (mut store, mut rx) = LiveGraphStore::with_events();
        let a = store.insert_node(Node::new("person:a", "A")).unwrap();
        let b = store.insert_node(Node::new("person:b", "B")).unwrap();
        store.insert_edge(a, b, "knows", TextValue::default()).unwrap();
        store.remove_node(a).unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events.len(), 5);
        assert!(matches!(events[3], GraphEvent::EdgeRemoved { .. }));
        assert_eq!(
            events[4],
            GraphEvent::NodeRemoved {
                handle: a,
                id: "person:a".to_string()
            }
        );
    }

    #[test]
    fn test_clear() {
        let (mut store, h) = store_with(&["person:a", "person:b"]);
        store.insert_edge(h[0], h[1], "knows", TextValue::default()).unwrap();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.next_edge_index(), 1);
        store.check_invariants().unwrap();
    }
}
