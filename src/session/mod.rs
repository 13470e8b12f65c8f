//! Graph session: owns the live store and drives sync cycles
//!
//! A session is created once, fed a selection of source ids, and torn down
//! on shutdown. Each selection starts a new cycle and cancels the previous
//! one; a cancelled cycle never touches the store again. Consumers read the
//! store through [`GraphSession::store`] and learn about merge passes through
//! [`GraphSession::subscribe`].

mod cycle;

pub use cycle::{CancelFlag, CycleSummary, GraphRevision, SharedStore};

use crate::config::GraphConfig;
use crate::graph::{LiveGraphStore, RawGraph};
use crate::merge::{MergeEngine, MergeReport, MultiEdgeLayout};
use crate::sources::SourceRegistry;
use cycle::{MergeTarget, SyncCycle};
use indexmap::IndexSet;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

struct ActiveCycle {
    cancel: CancelFlag,
    handle: JoinHandle<CycleSummary>,
}

impl ActiveCycle {
    fn cancel(&self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}

pub struct GraphSession {
    registry: SourceRegistry,
    target: MergeTarget,
    revisions: watch::Receiver<GraphRevision>,
    selected: Vec<String>,
    active: Option<ActiveCycle>,
}

impl GraphSession {
    pub fn new(registry: SourceRegistry, engine: MergeEngine, layout: MultiEdgeLayout) -> Self {
        let (tx, rx) = watch::channel(GraphRevision::default());
        GraphSession {
            registry,
            target: MergeTarget {
                store: Arc::new(RwLock::new(LiveGraphStore::new())),
                engine,
                layout,
                revisions: Arc::new(tx),
            },
            revisions: rx,
            selected: Vec::new(),
            active: None,
        }
    }

    /// Session over the configured catalog, identity mode and bow step
    pub fn from_config(config: &GraphConfig) -> Self {
        Self::new(
            SourceRegistry::from_config(&config.sources),
            MergeEngine::with_resolver(config.identity.resolver()),
            config.multi_edge_layout(),
        )
    }

    pub fn store(&self) -> SharedStore {
        Arc::clone(&self.target.store)
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Receiver of merge pass notifications
    pub fn subscribe(&self) -> watch::Receiver<GraphRevision> {
        self.revisions.clone()
    }

    pub fn revision(&self) -> GraphRevision {
        *self.revisions.borrow()
    }

    /// Source ids of the current selection
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_syncing(&self) -> bool {
        self.active.as_ref().map_or(false, |a| !a.handle.is_finished())
    }

    /// Replace the set of enabled sources
    ///
    /// Cancels the running cycle. An empty selection merges an empty graph
    /// right away, clearing the store; otherwise a new cycle is spawned and
    /// merges as each source completes. Duplicate ids are ignored.
    pub async fn select_sources<I, S>(&mut self, ids: I) -> Option<MergeReport>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cancel_active();

        let ids: IndexSet<String> = ids.into_iter().map(Into::into).collect();
        self.selected = ids.into_iter().collect();
        info!("selected sources: {:?}", self.selected);

        if self.selected.is_empty() {
            return self.target.apply(&RawGraph::default(), &CancelFlag::new()).await;
        }

        let cancel = CancelFlag::new();
        let cycle = SyncCycle {
            ids: self.selected.clone(),
            registry: self.registry.clone(),
            target: self.target.clone(),
            cancel: cancel.clone(),
        };
        self.active = Some(ActiveCycle {
            cancel,
            handle: tokio::spawn(cycle.run()),
        });
        None
    }

    /// Re-run the current selection, e.g. after upstream data changed
    pub async fn refresh(&mut self) -> Option<MergeReport> {
        let selected = self.selected.clone();
        self.select_sources(selected).await
    }

    /// Wait for the running cycle to finish
    ///
    /// Returns `None` when no cycle was running or it was aborted.
    pub async fn settle(&mut self) -> Option<CycleSummary> {
        let active = self.active.take()?;
        match active.handle.await {
            Ok(summary) => Some(summary),
            Err(e) if e.is_cancelled() => None,
            Err(e) => {
                warn!("sync cycle task failed: {}", e);
                None
            }
        }
    }

    /// Cancel any running cycle; the store keeps its last merged state
    pub fn shutdown(&mut self) {
        if self.active.is_some() {
            info!("shutting down graph session");
        }
        self.cancel_active();
    }

    fn cancel_active(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel();
        }
    }
}

impl Drop for GraphSession {
    fn drop(&mut self) {
        self.cancel_active();
    }
}

impl std::fmt::Debug for GraphSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphSession")
            .field("registry", &self.registry)
            .field("selected", &self.selected)
            .field("revision", &self.revision().revision)
            .field("syncing", &self.is_syncing())
            .finish()
    }
}
