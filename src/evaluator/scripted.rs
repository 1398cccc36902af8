// src/evaluator/scripted.rs — Deterministic stages with caller-supplied scores

use std::collections::VecDeque;

use super::{StageEvaluator, StageReport};
use crate::core::book::{BookView, DerivedAttributes};
use crate::infra::errors::PipelineError;

/// Always returns the same score.
pub struct FixedStage {
    id: String,
    score: f32,
}

impl FixedStage {
    pub fn new(id: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            score,
        }
    }
}

impl StageEvaluator for FixedStage {
    fn id(&self) -> &str {
        &self.id
    }

    fn evaluate(
        &mut self,
        _book: &BookView<'_>,
        _derived: &mut DerivedAttributes,
    ) -> Result<StageReport, PipelineError> {
        Ok(StageReport::score(self.score))
    }
}

/// Plays back a queue of results, one per call; the last result repeats
/// once the queue is drained.
pub struct ScriptedStage {
    id: String,
    script: VecDeque<Result<f32, String>>,
    last: Result<f32, String>,
    calls: u32,
}

impl ScriptedStage {
    pub fn new(id: impl Into<String>, scores: impl IntoIterator<Item = f32>) -> Self {
        Self::from_results(id, scores.into_iter().map(Ok))
    }

    /// `Err(message)` entries make the stage fail on that call.
    pub fn from_results(
        id: impl Into<String>,
        results: impl IntoIterator<Item = Result<f32, String>>,
    ) -> Self {
        Self {
            id: id.into(),
            script: results.into_iter().collect(),
            last: Ok(0.0),
            calls: 0,
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls
    }
}

impl StageEvaluator for ScriptedStage {
    fn id(&self) -> &str {
        &self.id
    }

    fn evaluate(
        &mut self,
        _book: &BookView<'_>,
        _derived: &mut DerivedAttributes,
    ) -> Result<StageReport, PipelineError> {
        self.calls += 1;
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        match &self.last {
            Ok(score) => Ok(StageReport::score(*score)),
            Err(message) => Err(PipelineError::stage(&self.id, message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::book::Book;

    #[test]
    fn test_scripted_repeats_last() {
        let mut stage = ScriptedStage::new("s", [1.0, 2.0]);
        let mut book = Book::new("T", "A").unwrap();
        let mut scores = Vec::new();
        for _ in 0..4 {
            let (view, derived) = book.stage_parts(1);
            scores.push(stage.evaluate(&view, derived).unwrap().score);
        }
        assert_eq!(scores, vec![1.0, 2.0, 2.0, 2.0]);
        assert_eq!(stage.calls(), 4);
    }

    #[test]
    fn test_scripted_failure() {
        let mut stage = ScriptedStage::from_results("s", [Ok(5.0), Err("offline".into())]);
        let mut book = Book::new("T", "A").unwrap();
        let (view, derived) = book.stage_parts(1);
        assert!(stage.evaluate(&view, derived).is_ok());
        let (view, derived) = book.stage_parts(2);
        let err = stage.evaluate(&view, derived).unwrap_err();
        assert_eq!(err.to_string(), "Stage 's' failed: offline");
    }
}
