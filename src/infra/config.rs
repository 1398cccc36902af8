// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::book::{Book, BookEntry};
use crate::core::collection::ItemFailure;
use crate::core::types::PipelineConfig;
use crate::evaluator::StageId;
use crate::infra::errors::PipelineError;
use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineSection,

    /// Catalog of books to run. Empty means "use the demo catalog".
    #[serde(default)]
    pub books: Vec<BookEntry>,
}

/// Raw `[pipeline]` section. Validated into `PipelineConfig` by `Config::pipeline()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSection {
    pub threshold: f32,
    /// Signed so that a negative value is reported as invalid instead of
    /// failing to parse.
    pub max_iterations: i64,
    pub stage_order: Vec<String>,
}

impl Default for PipelineSection {
    fn default() -> Self {
        let defaults = PipelineConfig::default();
        Self {
            threshold: defaults.threshold,
            max_iterations: defaults.max_iterations as i64,
            stage_order: StageId::DEFAULT_ORDER
                .iter()
                .map(|s| s.as_str().to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Load config from the default location, falling back to defaults.
    pub fn load() -> Result<Self, PipelineError> {
        match paths::config_file_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn pipeline(&self) -> Result<PipelineConfig, PipelineError> {
        PipelineConfig::try_from(&self.pipeline)
    }

    /// Build every catalog entry. An invalid entry is logged and set aside;
    /// the rest of the catalog still loads.
    pub fn catalog(&self) -> Catalog {
        let mut catalog = Catalog::default();
        for (index, entry) in self.books.iter().enumerate() {
            match entry.build() {
                Ok(book) => catalog.books.push(book),
                Err(e) => {
                    tracing::warn!(index, title = %entry.title, "Skipping catalog entry: {}", e);
                    catalog.rejected.push(ItemFailure {
                        index,
                        title: entry.title.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        catalog
    }
}

/// Books built from `[[books]]`, plus the entries that failed to build.
#[derive(Debug, Default)]
pub struct Catalog {
    pub books: Vec<Book>,
    pub rejected: Vec<ItemFailure>,
}
