//! Registry of data sources by id

use super::{DataSource, EmptySource, JsonFileSource};
use crate::config::SourceConfig;
use indexmap::IndexMap;
use std::sync::Arc;

/// Ordered map of dataset id to adapter
#[derive(Clone, Default)]
pub struct SourceRegistry {
    sources: IndexMap<String, Arc<dyn DataSource>>,
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("sources", &self.ids())
            .finish()
    }
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapters for a configured catalog
    ///
    /// Sources with a file are read from it; the rest are placeholders.
    pub fn from_config(sources: &[SourceConfig]) -> Self {
        let mut registry = Self::new();
        for source in sources {
            let adapter: Arc<dyn DataSource> = match &source.file {
                Some(path) => Arc::new(JsonFileSource::new(&source.id, path, source.format)),
                None => Arc::new(EmptySource::new(&source.id)),
            };
            registry.register(adapter);
        }
        registry
    }

    /// Add or replace the adapter for its id
    pub fn register(&mut self, source: Arc<dyn DataSource>) -> Option<Arc<dyn DataSource>> {
        self.sources.insert(source.id().to_string(), source)
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn DataSource>> {
        self.sources.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RawGraph;
    use crate::sources::StaticSource;

    #[test]
    fn test_register_replaces() {
        let mut registry = SourceRegistry::new();
        assert!(registry.register(Arc::new(EmptySource::new("www"))).is_none());
        assert!(registry
            .register(Arc::new(StaticSource::new("www", RawGraph::default())))
            .is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_from_config() {
        let sources = vec![
            SourceConfig::new("www", "WWW").with_file("/data/www.json"),
            SourceConfig::new("gaia", "GAIA AI"),
        ];
        let registry = SourceRegistry::from_config(&sources);
        assert_eq!(registry.ids(), vec!["www", "gaia"]);
        assert!(registry.contains("gaia"));
        assert!(registry.get("nao").is_none());
    }
}
