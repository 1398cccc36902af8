// src/evaluator/utils.rs — Helper functions for scoring and upgrade reports

use serde::{Deserialize, Serialize};

use crate::infra::errors::PipelineError;

pub const MIN_SCORE: f32 = 0.0;
pub const MAX_SCORE: f32 = 10.0;

/// Quality at or above which a manual review is enough to ship.
const REVIEW_BAND: f32 = 8.0;

/// Arithmetic mean of stage scores.
pub fn mean_score(scores: &[f32]) -> f32 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f32>() / scores.len() as f32
}

/// Reject scores a stage is not allowed to produce.
pub fn validate_score(stage: &str, score: f32) -> Result<f32, PipelineError> {
    if !score.is_finite() {
        return Err(PipelineError::stage(stage, "score is not a finite number"));
    }
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(PipelineError::stage(
            stage,
            format!("score {score:.2} outside [{MIN_SCORE}, {MAX_SCORE}]"),
        ));
    }
    Ok(score)
}

/// Improvement notes bucketed by what they touched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImprovementCategories {
    pub content: Vec<String>,
    pub formatting: Vec<String>,
    pub design: Vec<String>,
    pub technical: Vec<String>,
    pub commercial: Vec<String>,
}

impl ImprovementCategories {
    pub fn total(&self) -> usize {
        self.content.len()
            + self.formatting.len()
            + self.design.len()
            + self.technical.len()
            + self.commercial.len()
    }
}

/// Sort notes into categories by keyword. Notes matching nothing are dropped.
pub fn categorize_improvements(improvements: &[String]) -> ImprovementCategories {
    let mut cats = ImprovementCategories::default();
    for note in improvements {
        let lower = note.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));
        if has(&["content", "text"]) {
            cats.content.push(note.clone());
        } else if has(&["format", "layout"]) {
            cats.formatting.push(note.clone());
        } else if has(&["design", "cover"]) {
            cats.design.push(note.clone());
        } else if has(&["technical", "bug"]) {
            cats.technical.push(note.clone());
        } else if has(&["revenue", "price"]) {
            cats.commercial.push(note.clone());
        }
    }
    cats
}

/// Recommended follow-ups for a book that finished a run at `quality`.
pub fn next_steps(quality: f32, threshold: f32) -> Vec<String> {
    let steps: &[&str] = if quality >= threshold {
        &[
            "Ready for publication",
            "Start go-to-market",
            "Monitor post-launch performance",
        ]
    } else if quality >= REVIEW_BAND {
        &[
            "Manual final review recommended",
            "Collect beta reader feedback",
            "Schedule a follow-up upgrade",
        ]
    } else {
        &[
            "Run another upgrade pass",
            "Editor-in-chief intervention required",
            "Re-evaluate quality requirements",
        ]
    };
    steps.iter().map(|s| s.to_string()).collect()
}
