// src/core/types.rs — Core domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::evaluator::utils::{ImprovementCategories, MAX_SCORE};
use crate::evaluator::StageId;
use crate::infra::errors::PipelineError;

/// Lifecycle state of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Draft,
    InProgress,
    Perfect,
    Published,
}

impl Status {
    /// Status after an iteration produced `quality`.
    ///
    /// `Perfect` holds iff the latest quality met the threshold. A zero-score
    /// iteration leaves a draft untouched.
    pub fn after_iteration(self, quality: f32, threshold: f32) -> Status {
        if quality >= threshold {
            return Status::Perfect;
        }
        match self {
            Status::Perfect => Status::InProgress,
            Status::Draft if quality > 0.0 => Status::InProgress,
            other => other,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Draft => write!(f, "DRAFT"),
            Status::InProgress => write!(f, "IN_PROGRESS"),
            Status::Perfect => write!(f, "PERFECT"),
            Status::Published => write!(f, "PUBLISHED"),
        }
    }
}

/// Result of the publish gate. Anything but `Published` is a refusal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishOutcome {
    Published,
    AlreadyPublished,
    NotEligible,
}

impl PublishOutcome {
    pub fn is_rejected(&self) -> bool {
        !matches!(self, PublishOutcome::Published)
    }
}

impl std::fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishOutcome::Published => write!(f, "published"),
            PublishOutcome::AlreadyPublished => write!(f, "already published"),
            PublishOutcome::NotEligible => write!(f, "not eligible"),
        }
    }
}

/// Configuration for the convergence loop.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub threshold: f32,
    pub max_iterations: u32,
    pub stage_order: Vec<StageId>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: 9.5,
            max_iterations: 10,
            stage_order: StageId::DEFAULT_ORDER.to_vec(),
        }
    }
}

impl PipelineConfig {
    /// Build a validated config. `max_iterations` is signed so that negative
    /// values from user input are reported rather than wrapped.
    pub fn new(
        threshold: f32,
        max_iterations: i64,
        stage_order: Vec<StageId>,
    ) -> Result<Self, PipelineError> {
        let max_iterations = u32::try_from(max_iterations).map_err(|_| {
            PipelineError::InvalidConfiguration(format!(
                "max_iterations must be between 0 and {}, got {max_iterations}",
                u32::MAX
            ))
        })?;
        let config = Self {
            threshold,
            max_iterations,
            stage_order,
        };
        config.validate()?;
        Ok(config)
    }

    /// Full validation: loop limits and the built-in stage order.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.validate_limits()?;
        self.validate_stage_order()
    }

    /// Threshold checks only. Used when the caller supplies its own stages.
    pub fn validate_limits(&self) -> Result<(), PipelineError> {
        if !self.threshold.is_finite() {
            return Err(PipelineError::InvalidConfiguration(
                "threshold must be a finite number".into(),
            ));
        }
        if self.threshold > MAX_SCORE {
            return Err(PipelineError::InvalidConfiguration(format!(
                "threshold {:.2} is above the maximum score {MAX_SCORE}",
                self.threshold
            )));
        }
        Ok(())
    }

    pub fn validate_stage_order(&self) -> Result<(), PipelineError> {
        if self.stage_order.is_empty() {
            return Err(PipelineError::InvalidConfiguration(
                "stage_order must name at least one stage".into(),
            ));
        }
        for (i, stage) in self.stage_order.iter().enumerate() {
            if self.stage_order[..i].contains(stage) {
                return Err(PipelineError::InvalidConfiguration(format!(
                    "stage '{stage}' listed twice in stage_order"
                )));
            }
        }
        Ok(())
    }
}

impl TryFrom<&crate::infra::config::PipelineSection> for PipelineConfig {
    type Error = PipelineError;

    fn try_from(section: &crate::infra::config::PipelineSection) -> Result<Self, Self::Error> {
        let stage_order = section
            .stage_order
            .iter()
            .map(|s| s.parse::<StageId>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(section.threshold, section.max_iterations, stage_order)
    }
}

/// Summary of one completed convergence run over a book.
#[derive(Debug, Clone, Serialize)]
pub struct UpgradeOutcome {
    pub run_id: String,
    pub title: String,
    pub iterations: u32,
    pub quality_progression: Vec<f32>,
    pub final_quality: f32,
    pub converged: bool,
    pub version: u32,
    pub status: Status,
    pub improvements: Vec<String>,
    pub categories: ImprovementCategories,
    pub hooks_run: Vec<String>,
    pub next_steps: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

/// Where in the coordinator's phase sequence a metrics snapshot was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsPhase {
    AfterUpgrade,
    AfterPublish,
}

impl std::fmt::Display for MetricsPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsPhase::AfterUpgrade => write!(f, "after upgrade"),
            MetricsPhase::AfterPublish => write!(f, "after publish"),
        }
    }
}

/// Events handed to the reporting collaborator. The core never renders them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    UpgradeStarted {
        title: String,
        version: u32,
    },
    IterationStarted {
        title: String,
        iteration: u32,
        max_iterations: u32,
    },
    StageScored {
        title: String,
        iteration: u32,
        stage: String,
        score: f32,
    },
    QualityUpdated {
        title: String,
        iteration: u32,
        quality: f32,
    },
    StatusChanged {
        title: String,
        from: Status,
        to: Status,
    },
    HookRan {
        title: String,
        hook: String,
    },
    UpgradeCompleted {
        title: String,
        version: u32,
        iterations: u32,
        converged: bool,
        quality: f32,
    },
    UpgradeFailed {
        title: String,
        error: String,
    },
    PublishResult {
        title: String,
        outcome: PublishOutcome,
    },
    MetricsSnapshot {
        phase: MetricsPhase,
        metrics: super::collection::CollectionMetrics,
    },
}
