//! JSON file adapter

use super::{DataSource, SourceError, SourceResult};
use crate::graph::{RawGraph, RecordSet};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Layout of a source file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// `{nodes, links}` already in the adapter contract shape
    #[default]
    Graph,
    /// `{entities, relationships}` tables, converted on load
    Records,
}

/// Dataset read from a JSON file on every fetch
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    id: String,
    path: PathBuf,
    format: SourceFormat,
}

impl JsonFileSource {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>, format: SourceFormat) -> Self {
        JsonFileSource {
            id: id.into(),
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn parse(&self, bytes: &[u8]) -> SourceResult<RawGraph> {
        let parsed = match self.format {
            SourceFormat::Graph => serde_json::from_slice::<RawGraph>(bytes),
            SourceFormat::Records => serde_json::from_slice::<RecordSet>(bytes).map(RawGraph::from),
        };
        parsed.map_err(|source| SourceError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

#[async_trait]
impl DataSource for JsonFileSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch(&self) -> SourceResult<RawGraph> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;
        let graph = self.parse(&bytes)?;
        debug!(
            source = %self.id,
            nodes = graph.nodes.len(),
            links = graph.links.len(),
            "loaded source file"
        );
        Ok(graph)
    }
}
