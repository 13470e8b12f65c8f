use async_trait::async_trait;
use commons_graph::graph::{LiveGraphStore, Node, RawEdge, RawGraph};
use commons_graph::merge::{MergeEngine, MultiEdgeLayout};
use commons_graph::session::GraphSession;
use commons_graph::sources::{
    DataSource, JsonFileSource, SourceError, SourceFormat, SourceRegistry, SourceResult,
    StaticSource,
};
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;

/// Source that answers after a fixed delay
struct DelayedSource {
    id: String,
    delay: Duration,
    graph: RawGraph,
}

impl DelayedSource {
    fn new(id: &str, delay_ms: u64, graph: RawGraph) -> Self {
        DelayedSource {
            id: id.to_string(),
            delay: Duration::from_millis(delay_ms),
            graph,
        }
    }
}

#[async_trait]
impl DataSource for DelayedSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch(&self) -> SourceResult<RawGraph> {
        tokio::time::sleep(self.delay).await;
        Ok(self.graph.clone())
    }
}

struct FailingSource(String);

#[async_trait]
impl DataSource for FailingSource {
    fn id(&self) -> &str {
        &self.0
    }

    async fn fetch(&self) -> SourceResult<RawGraph> {
        Err(SourceError::Fetch {
            source_id: self.0.clone(),
            message: "HTTP 503".to_string(),
        })
    }
}

fn graph(nodes: &[(&str, &str)], links: &[(&str, &str, &str)]) -> RawGraph {
    RawGraph::new(
        nodes.iter().map(|(id, name)| Node::new(*id, *name)).collect(),
        links.iter().map(|(s, t, ty)| RawEdge::new(*s, *t, *ty)).collect(),
    )
}

fn session(sources: Vec<Arc<dyn DataSource>>) -> GraphSession {
    let mut registry = SourceRegistry::new();
    for source in sources {
        registry.register(source);
    }
    GraphSession::new(registry, MergeEngine::new(), MultiEdgeLayout::default())
}

fn ids(store: &LiveGraphStore) -> Vec<String> {
    let mut ids: Vec<String> = store.nodes().map(|n| n.id().to_string()).collect();
    ids.sort();
    ids
}

fn triples(store: &LiveGraphStore) -> Vec<String> {
    let mut keys: Vec<String> = store
        .edges()
        .filter_map(|e| store.edge_key(e))
        .map(|k| k.to_string())
        .collect();
    keys.sort();
    keys
}

#[tokio::test]
async fn test_merges_after_each_source() {
    let mut session = session(vec![
        Arc::new(DelayedSource::new("www", 10, graph(&[("person:a", "A")], &[]))),
        Arc::new(DelayedSource::new("cta", 40, graph(&[("project:p", "P")], &[]))),
    ]);
    let mut revisions = session.subscribe();

    session.select_sources(["www", "cta"]).await;

    revisions.changed().await.unwrap();
    assert_eq!(revisions.borrow_and_update().revision, 1);
    assert_eq!(ids(&*session.store().read().await), vec!["person:a"]);

    let summary = session.settle().await.unwrap();
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.merges, 2);
    assert_eq!(ids(&*session.store().read().await), vec!["person:a", "project:p"]);
    assert_eq!(session.revision().revision, 2);
}

#[tokio::test]
async fn test_failing_source_contributes_nothing() {
    let mut session = session(vec![
        Arc::new(StaticSource::new("www", graph(&[("person:a", "A")], &[]))),
        Arc::new(FailingSource("gaia".to_string())),
        Arc::new(JsonFileSource::new("nao", "/nonexistent/nao.json", SourceFormat::Graph)),
    ]);

    session.select_sources(["www", "gaia", "nao"]).await;
    let summary = session.settle().await.unwrap();
    assert_eq!(summary.completed, 3);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.merges, 3);
    assert_eq!(ids(&*session.store().read().await), vec!["person:a"]);
}

#[tokio::test]
async fn test_unknown_source_id_contributes_nothing() {
    let mut session = session(vec![Arc::new(StaticSource::new("www", graph(&[("person:a", "A")], &[])))]);

    session.select_sources(["www", "atlas"]).await;
    let summary = session.settle().await.unwrap();
    assert_eq!(summary.failed, 0);
    assert_eq!(ids(&*session.store().read().await), vec!["person:a"]);
}

#[tokio::test]
async fn test_reselect_cancels_in_flight_fetches() {
    let mut session = session(vec![
        Arc::new(DelayedSource::new("fast", 5, graph(&[("person:a", "A")], &[]))),
        Arc::new(DelayedSource::new("slow", 100, graph(&[("person:slow", "Slow")], &[]))),
    ]);

    session.select_sources(["fast", "slow"]).await;
    session.select_sources(["fast"]).await;
    let summary = session.settle().await.unwrap();
    assert!(!summary.cancelled);

    // Past the point where the superseded fetch would have resolved
    tokio::time::sleep(Duration::from_millis(200)).await;
    let store = session.store();
    let store = store.read().await;
    assert_eq!(ids(&store), vec!["person:a"]);
    assert_eq!(session.revision().revision, 1);
}

#[tokio::test]
async fn test_shutdown_stops_further_merges() {
    let mut session = session(vec![Arc::new(DelayedSource::new(
        "slow",
        50,
        graph(&[("person:slow", "Slow")], &[]),
    ))]);

    session.select_sources(["slow"]).await;
    assert!(session.is_syncing());
    session.shutdown();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(session.store().read().await.is_empty());
    assert_eq!(session.revision().revision, 0);
    assert!(session.settle().await.is_none());
}

#[tokio::test]
async fn test_dropping_session_cancels_cycle() {
    let session_store;
    {
        let mut session = session(vec![Arc::new(DelayedSource::new(
            "slow",
            50,
            graph(&[("person:slow", "Slow")], &[]),
        ))]);
        session.select_sources(["slow"]).await;
        session_store = session.store();
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(session_store.read().await.is_empty());
}

#[tokio::test]
async fn test_toggling_source_off_prunes_its_nodes() {
    let mut session = session(vec![
        Arc::new(StaticSource::new(
            "www",
            graph(&[("person:x", "X"), ("person:s", "S")], &[("person:x", "person:s", "knows")]),
        )),
        Arc::new(StaticSource::new("cta", graph(&[("person:s", "S")], &[]))),
    ]);

    session.select_sources(["www", "cta"]).await;
    session.settle().await;
    let survivor = session.store().read().await.node_handle("person:s").unwrap();

    session.select_sources(["cta"]).await;
    session.settle().await;
    let store = session.store();
    let store = store.read().await;
    assert_eq!(ids(&store), vec!["person:s"]);
    assert_eq!(store.edge_count(), 0);
    assert_eq!(store.node_handle("person:s"), Some(survivor));
}

#[tokio::test]
async fn test_final_state_independent_of_arrival_order() {
    let datasets = vec![
        (
            "www",
            graph(
                &[("person:a", "A"), ("project:p", "P")],
                &[("person:a", "project:p", "maintainer"), ("person:a", "organization:o", "memberOf")],
            ),
        ),
        (
            "cta",
            graph(
                &[("organization:o", "O"), ("person:a", "A")],
                &[("organization:o", "project:p", "funds")],
            ),
        ),
        (
            "gaia",
            graph(
                &[("person:b", "B"), ("project:p", "P")],
                &[("person:b", "person:a", "knows"), ("person:b", "project:p", "contributor")],
            ),
        ),
        ("nao", graph(&[("person:c", "C")], &[("person:c", "person:b", "knows")])),
    ];

    let mut expected: Option<(Vec<String>, Vec<String>)> = None;
    let mut rng = rand::thread_rng();
    for _ in 0..5 {
        let mut delays: Vec<u64> = vec![1, 8, 16, 24];
        delays.shuffle(&mut rng);

        let sources: Vec<Arc<dyn DataSource>> = datasets
            .iter()
            .zip(&delays)
            .map(|((id, g), delay)| Arc::new(DelayedSource::new(id, *delay, g.clone())) as Arc<dyn DataSource>)
            .collect();
        let mut session = session(sources);
        session.select_sources(["www", "cta", "gaia", "nao"]).await;
        session.settle().await.unwrap();

        let store = session.store();
        let store = store.read().await;
        store.check_invariants().unwrap();
        let state = (ids(&store), triples(&store));
        match &expected {
            Some(expected) => assert_eq!(&state, expected),
            None => expected = Some(state),
        }
    }

    let (nodes, edges) = expected.unwrap();
    assert_eq!(nodes.len(), 5);
    assert_eq!(edges.len(), 6);
}

#[tokio::test]
async fn test_first_arrival_stays_canonical_under_name_collision() {
    // Same name under distinct ids; whichever lands first keeps its id
    for (fast, slow, canonical) in [
        ("person:alice", "person:alice_dup", "person:alice"),
        ("person:alice_dup", "person:alice", "person:alice_dup"),
    ] {
        let mut session = session(vec![
            Arc::new(DelayedSource::new("www", 1, graph(&[(fast, "Alice")], &[]))),
            Arc::new(DelayedSource::new(
                "cta",
                40,
                graph(&[(slow, "Alice"), ("org:acme", "Acme")], &[(slow, "org:acme", "memberOf")]),
            )),
        ]);
        session.select_sources(["www", "cta"]).await;
        let summary = session.settle().await.unwrap();
        assert_eq!(summary.merges, 2);

        let store = session.store();
        let store = store.read().await;
        assert_eq!(ids(&store), vec!["org:acme".to_string(), canonical.to_string()]);
        assert_eq!(triples(&store), vec![format!("{}-memberOf-org:acme", canonical)]);
        store.check_invariants().unwrap();
    }
}
