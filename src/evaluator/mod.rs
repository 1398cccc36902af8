// src/evaluator/mod.rs — Stage evaluator framework

pub mod scripted;
pub mod stages;
pub mod utils;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::book::{BookView, DerivedAttributes};
use crate::infra::errors::PipelineError;
use utils::validate_score;

/// Identifiers of the built-in stages, in the order they run by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageId {
    AntiDegradation,
    ExternalReview,
    QualityAnalysis,
    RevenueOptimization,
    DesignEnhancer,
}

impl StageId {
    pub const DEFAULT_ORDER: [StageId; 4] = [
        StageId::AntiDegradation,
        StageId::ExternalReview,
        StageId::QualityAnalysis,
        StageId::RevenueOptimization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AntiDegradation => "anti-degradation",
            Self::ExternalReview => "external-review",
            Self::QualityAnalysis => "quality-analysis",
            Self::RevenueOptimization => "revenue-optimization",
            Self::DesignEnhancer => "design-enhancer",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageId {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "anti-degradation" => Ok(Self::AntiDegradation),
            "external-review" => Ok(Self::ExternalReview),
            "quality-analysis" => Ok(Self::QualityAnalysis),
            "revenue-optimization" => Ok(Self::RevenueOptimization),
            "design-enhancer" => Ok(Self::DesignEnhancer),
            other => Err(PipelineError::InvalidConfiguration(format!(
                "unknown stage '{other}'"
            ))),
        }
    }
}

/// What a stage hands back for one book in one iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub score: f32,
    pub improvements: Vec<String>,
}

impl StageReport {
    pub fn score(score: f32) -> Self {
        Self {
            score,
            improvements: Vec::new(),
        }
    }
}

/// A pluggable scoring unit. Produces one score in `[0, 10]` per iteration.
///
/// Stages see the book read-only and may only touch its derived attributes,
/// so they can never move quality or status themselves.
pub trait StageEvaluator {
    fn id(&self) -> &str;

    fn evaluate(
        &mut self,
        book: &BookView<'_>,
        derived: &mut DerivedAttributes,
    ) -> Result<StageReport, PipelineError>;
}

/// Scores collected from one pass over every registered stage.
#[derive(Debug, Clone, Default)]
pub struct RoundResult {
    pub scores: Vec<(String, f32)>,
    pub improvements: Vec<String>,
}

impl RoundResult {
    pub fn mean(&self) -> f32 {
        let scores: Vec<f32> = self.scores.iter().map(|(_, s)| *s).collect();
        utils::mean_score(&scores)
    }
}

/// Ordered, non-empty list of stages run once per iteration.
pub struct StagePipeline {
    stages: Vec<Box<dyn StageEvaluator>>,
}

impl StagePipeline {
    pub fn new(stages: Vec<Box<dyn StageEvaluator>>) -> Result<Self, PipelineError> {
        if stages.is_empty() {
            return Err(PipelineError::InvalidConfiguration(
                "stage pipeline must contain at least one stage".into(),
            ));
        }
        Ok(Self { stages })
    }

    /// Build the built-in stages in the given order.
    pub fn from_order(order: &[StageId]) -> Result<Self, PipelineError> {
        Self::new(
            order
                .iter()
                .map(|id| Box::new(stages::BuiltinStage::new(*id)) as Box<dyn StageEvaluator>)
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.stages.iter().map(|s| s.id().to_string()).collect()
    }

    /// Run every stage once, in order. The first failing stage aborts the round.
    pub fn run_round(
        &mut self,
        book: &BookView<'_>,
        derived: &mut DerivedAttributes,
    ) -> Result<RoundResult, PipelineError> {
        let mut round = RoundResult::default();
        for stage in self.stages.iter_mut() {
            let report = stage.evaluate(book, derived)?;
            let score = validate_score(stage.id(), report.score)?;
            round.scores.push((stage.id().to_string(), score));
            round.improvements.extend(report.improvements);
        }
        Ok(round)
    }
}

#[cfg(test)]
mod tests {
    use super::scripted::FixedStage;
    use super::*;
    use crate::core::book::Book;

    // ─── StageId ────────────────────────────────────────────────

    #[test]
    fn test_stage_id_roundtrip() {
        for id in [
            StageId::AntiDegradation,
            StageId::ExternalReview,
            StageId::QualityAnalysis,
            StageId::RevenueOptimization,
            StageId::DesignEnhancer,
        ] {
            assert_eq!(id.as_str().parse::<StageId>().unwrap(), id);
        }
    }

    #[test]
    fn test_stage_id_unknown() {
        let err = "grok".parse::<StageId>().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_default_order() {
        let names: Vec<&str> = StageId::DEFAULT_ORDER.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "anti-degradation",
                "external-review",
                "quality-analysis",
                "revenue-optimization"
            ]
        );
    }

    // ─── StagePipeline ──────────────────────────────────────────

    #[test]
    fn test_empty_pipeline_rejected() {
        assert!(StagePipeline::new(vec![]).is_err());
        assert!(StagePipeline::from_order(&[]).is_err());
    }

    #[test]
    fn test_round_collects_scores_in_order() {
        let mut pipeline = StagePipeline::new(vec![
            Box::new(FixedStage::new("a", 2.0)),
            Box::new(FixedStage::new("b", 4.0)),
        ])
        .unwrap();
        let mut book = Book::new("T", "A").unwrap();
        let (view, derived) = book.stage_parts(1);
        let round = pipeline.run_round(&view, derived).unwrap();
        assert_eq!(round.scores, vec![("a".into(), 2.0), ("b".into(), 4.0)]);
        assert!((round.mean() - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_round_rejects_out_of_range_score() {
        let mut pipeline =
            StagePipeline::new(vec![Box::new(FixedStage::new("wild", 11.0))]).unwrap();
        let mut book = Book::new("T", "A").unwrap();
        let (view, derived) = book.stage_parts(1);
        let err = pipeline.run_round(&view, derived).unwrap_err();
        assert!(matches!(err, PipelineError::StageEvaluation { ref stage, .. } if stage == "wild"));
    }

    #[test]
    fn test_builtin_ids() {
        let pipeline = StagePipeline::from_order(&StageId::DEFAULT_ORDER).unwrap();
        assert_eq!(pipeline.len(), 4);
        assert_eq!(pipeline.ids()[1], "external-review");
    }
}
