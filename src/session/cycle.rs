//! One sync cycle: fetch every selected source concurrently and re-merge
//! after each completion

use crate::graph::{LiveGraphStore, RawGraph};
use crate::merge::{MergeEngine, MergeReport, MultiEdgeLayout};
use crate::resolve::resolve_sources;
use crate::sources::SourceRegistry;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, error, info, warn};

/// Store shared between the session, its cycles and readers
pub type SharedStore = Arc<RwLock<LiveGraphStore>>;

/// Published after every applied merge pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRevision {
    /// Number of merge passes applied since the session started
    pub revision: u64,
    pub report: MergeReport,
}

/// How a cycle ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSummary {
    /// Sources that completed, failures included
    pub completed: usize,
    pub failed: usize,
    /// Merge passes applied to the store
    pub merges: usize,
    pub cancelled: bool,
}

/// Monotonic cancellation flag; once set it never clears
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything needed to apply a candidate graph to the live store
#[derive(Clone)]
pub(crate) struct MergeTarget {
    pub store: SharedStore,
    pub engine: MergeEngine,
    pub layout: MultiEdgeLayout,
    pub revisions: Arc<watch::Sender<GraphRevision>>,
}

impl MergeTarget {
    /// Merge, lay out and publish, unless `cancel` is set
    ///
    /// The flag is read under the write lock: once a canceller has set it,
    /// no pass of that cycle can reach the store.
    pub async fn apply(&self, candidate: &RawGraph, cancel: &CancelFlag) -> Option<MergeReport> {
        let mut store = self.store.write().await;
        if cancel.is_cancelled() {
            debug!("discarding merge of a cancelled cycle");
            return None;
        }

        let report = self.engine.merge(&mut store, candidate);
        self.layout.apply(&mut store);
        if let Err(e) = store.check_invariants() {
            error!("live graph invariant violated after merge: {}", e);
        }

        self.revisions.send_modify(|current| {
            current.revision += 1;
            current.report = report;
        });
        Some(report)
    }
}

/// A fan-out of source fetches feeding a single merge consumer
pub(crate) struct SyncCycle {
    pub ids: Vec<String>,
    pub registry: SourceRegistry,
    pub target: MergeTarget,
    pub cancel: CancelFlag,
}

impl SyncCycle {
    pub async fn run(self) -> CycleSummary {
        let mut summary = CycleSummary::default();
        info!("sync cycle started for {} sources: {:?}", self.ids.len(), self.ids);

        let mut pending = FuturesUnordered::new();
        for (slot, id) in self.ids.iter().enumerate() {
            let source = self.registry.get(id);
            let id = id.clone();
            pending.push(async move {
                let result = match source {
                    Some(source) => source.fetch().await,
                    None => {
                        warn!("unknown source {}, contributing nothing", id);
                        Ok(RawGraph::default())
                    }
                };
                (slot, id, result)
            });
        }

        // Results by selection slot, so resolution order follows the selection
        // rather than arrival order
        let mut resolved: Vec<Option<RawGraph>> = (0..self.ids.len()).map(|_| None).collect();

        while let Some((slot, id, result)) = pending.next().await {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            summary.completed += 1;

            let graph = match result {
                Ok(graph) => {
                    debug!(
                        "source {} returned {} nodes, {} links",
                        id,
                        graph.nodes.len(),
                        graph.links.len()
                    );
                    graph
                }
                Err(e) => {
                    warn!("source {} failed, treating as empty: {}", id, e);
                    summary.failed += 1;
                    RawGraph::default()
                }
            };
            resolved[slot] = Some(graph);

            let candidate = resolve_sources(resolved.iter().flatten());
            match self.target.apply(&candidate, &self.cancel).await {
                Some(_) => summary.merges += 1,
                None => {
                    summary.cancelled = true;
                    break;
                }
            }
        }

        if summary.cancelled {
            info!("sync cycle cancelled after {} merges", summary.merges);
        } else {
            info!(
                "sync cycle finished: {} sources, {} failed, {} merges",
                summary.completed, summary.failed, summary.merges
            );
        }
        summary
    }
}
