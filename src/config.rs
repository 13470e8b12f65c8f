//! Configuration: layout, identity strategy, initial filter and the source
//! catalog
//!
//! ```yaml
//! layout:
//!   bow_step: 0.2
//! identity: exact
//! sources:
//!   - id: www
//!     title: WWW
//!     subtitle: World Wise Web
//!     enabled: true
//!     file: data/www.json
//!     format: records
//! ```

use crate::merge::{MultiEdgeLayout, DEFAULT_BOW_STEP};
use crate::resolve::IdentityMode;
use crate::sources::SourceFormat;
use crate::view::GraphFilter;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config syntax: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Curvature between neighbouring parallel edges
    pub bow_step: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            bow_step: DEFAULT_BOW_STEP,
        }
    }
}

/// One dataset in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    /// JSON file backing the dataset; none means a placeholder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub format: SourceFormat,
}

impl SourceConfig {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        SourceConfig {
            id: id.into(),
            title: title.into(),
            subtitle: None,
            description: None,
            enabled: false,
            file: None,
            format: SourceFormat::default(),
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub layout: LayoutConfig,
    pub identity: IdentityMode,
    pub filter: GraphFilter,
    pub sources: Vec<SourceConfig>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            layout: LayoutConfig::default(),
            identity: IdentityMode::default(),
            filter: GraphFilter::default(),
            sources: default_catalog(),
        }
    }
}

/// Community datasets known out of the box
fn default_catalog() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new("federation", "THE FEDERATION")
            .with_subtitle("Global Community of Federated Regenerative Business"),
        SourceConfig::new("www", "WWW")
            .with_subtitle("World Wise Web")
            .enabled(true),
        SourceConfig::new("cta", "CTA").with_description("Collaborative Tech Alliance"),
        SourceConfig::new("gaia", "GAIA AI").with_description("Augmenting Earth's Natural Intelligence"),
        SourceConfig::new("newcoin", "NEWCOIN")
            .with_description("A Peer-to-Peer Decentralized AI System"),
        SourceConfig::new("atlas", "ATLAS").with_description("Atlas Research Group"),
        SourceConfig::new("biom", "BIOM")
            .with_description("Bioregional Manufacturing and R&D Hub"),
        SourceConfig::new("nao", "NAO").with_description("Networked Adaptive Organisms"),
    ]
}

impl GraphConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: GraphConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file; relative source paths resolve against its directory
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&yaml)?;

        if let Some(base) = path.parent() {
            for source in &mut config.sources {
                if let Some(file) = source.file.as_mut() {
                    if file.is_relative() {
                        *file = base.join(&*file);
                    }
                }
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.layout.bow_step.is_finite() || self.layout.bow_step < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "layout.bow_step must be a non-negative number, got {}",
                self.layout.bow_step
            )));
        }

        let mut ids = FxHashSet::default();
        for source in &self.sources {
            if source.id.trim().is_empty() {
                return Err(ConfigError::Invalid("source id must not be empty".to_string()));
            }
            if !ids.insert(source.id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate source id {}", source.id)));
            }
        }
        Ok(())
    }

    /// Ids of sources enabled in the catalog, in catalog order
    pub fn enabled_ids(&self) -> Vec<String> {
        self.sources
            .iter()
            .filter(|s| s.enabled)
            .map(|s| s.id.clone())
            .collect()
    }

    pub fn multi_edge_layout(&self) -> MultiEdgeLayout {
        MultiEdgeLayout::new(self.layout.bow_step)
    }
}
