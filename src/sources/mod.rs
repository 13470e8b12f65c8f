//! Data source adapters
//!
//! Every source produces a [`RawGraph`]: a flat node list plus a flat edge
//! list referencing nodes by id. Adapters differ in transport and schema but
//! agree on this contract. A failing adapter returns a [`SourceError`]; the
//! session logs it and treats the source as having contributed nothing.

pub mod file;
pub mod registry;

use crate::graph::RawGraph;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

pub use file::{JsonFileSource, SourceFormat};
pub use registry::SourceRegistry;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Raised by adapters over a remote transport
    #[error("Fetch failed for source {source_id}: {message}")]
    Fetch { source_id: String, message: String },
}

pub type SourceResult<T> = Result<T, SourceError>;

/// A dataset that can be fetched as a [`RawGraph`]
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Unique key of the dataset
    fn id(&self) -> &str;

    async fn fetch(&self) -> SourceResult<RawGraph>;
}

/// Placeholder dataset that contributes nothing
#[derive(Debug, Clone)]
pub struct EmptySource {
    id: String,
}

impl EmptySource {
    pub fn new(id: impl Into<String>) -> Self {
        EmptySource { id: id.into() }
    }
}

#[async_trait]
impl DataSource for EmptySource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch(&self) -> SourceResult<RawGraph> {
        Ok(RawGraph::default())
    }
}

/// In-memory dataset, returned as-is on every fetch
#[derive(Debug, Clone)]
pub struct StaticSource {
    id: String,
    graph: RawGraph,
}

impl StaticSource {
    pub fn new(id: impl Into<String>, graph: RawGraph) -> Self {
        StaticSource {
            id: id.into(),
            graph,
        }
    }
}

#[async_trait]
impl DataSource for StaticSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch(&self) -> SourceResult<RawGraph> {
        Ok(self.graph.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;

    #[tokio::test]
    async fn test_empty_source() {
        let source = EmptySource::new("gaia");
        assert_eq!(source.id(), "gaia");
        assert!(source.fetch().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_static_source_is_repeatable() {
        let graph = RawGraph::new(vec![Node::new("person:a", "A")], vec![]);
        let source = StaticSource::new("www", graph.clone());
        assert_eq!(source.fetch().await.unwrap(), graph);
        assert_eq!(source.fetch().await.unwrap(), graph);
    }

    #[test]
    fn test_error_display() {
        let err = SourceError::Fetch {
            source_id: "cta".to_string(),
            message: "HTTP 502".to_string(),
        };
        assert_eq!(err.to_string(), "Fetch failed for source cta: HTTP 502");
    }
}
