// src/infra/errors.rs — Error types for bookloop

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    // Construction errors (fail fast, never mid-loop)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Missing required field '{field}' for book '{title}'")]
    MissingField { title: String, field: String },

    // Per-book errors (recorded by batch operations, never fatal to siblings)
    #[error("Stage '{stage}' failed: {message}")]
    StageEvaluation { stage: String, message: String },

    #[error("Book '{title}' is already published and cannot be upgraded")]
    AlreadyPublished { title: String },

    // Infra
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::StageEvaluation {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Errors scoped to a single book. Batch operations record these and move on.
    pub fn is_item_scoped(&self) -> bool {
        matches!(
            self,
            PipelineError::StageEvaluation { .. } | PipelineError::AlreadyPublished { .. }
        )
    }
}
