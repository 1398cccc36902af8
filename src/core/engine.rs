// src/core/engine.rs — Convergence loop and publish gate

use chrono::Utc;

use super::book::Book;
use super::hooks::{run_extra_stages, HookPhase};
use super::types::*;
use crate::evaluator::utils::{categorize_improvements, next_steps};
use crate::evaluator::StagePipeline;
use crate::infra::errors::PipelineError;

/// Drives books through the score-refine loop.
pub struct UpgradeEngine {
    config: PipelineConfig,
    stages: StagePipeline,
    /// Optional callback for pipeline events.
    on_event: Option<Box<dyn Fn(PipelineEvent) + Send>>,
}

/// Scratch state for one run, turned into an `UpgradeOutcome` at the end.
#[derive(Default)]
struct RunLog {
    progression: Vec<f32>,
    improvements: Vec<String>,
    hooks_run: Vec<String>,
    converged: bool,
}

impl UpgradeEngine {
    /// Engine with the built-in stages listed in `config.stage_order`.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let stages = StagePipeline::from_order(&config.stage_order)?;
        Ok(Self {
            config,
            stages,
            on_event: None,
        })
    }

    /// Engine with a caller-built pipeline. `config.stage_order` is neither
    /// validated nor used; `stage_ids()` reports the stages that actually run.
    pub fn with_stages(config: PipelineConfig, stages: StagePipeline) -> Result<Self, PipelineError> {
        config.validate_limits()?;
        Ok(Self {
            config,
            stages,
            on_event: None,
        })
    }

    /// Set a callback that receives every `PipelineEvent`.
    pub fn with_events(mut self, cb: impl Fn(PipelineEvent) + Send + 'static) -> Self {
        self.on_event = Some(Box::new(cb));
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn stage_ids(&self) -> Vec<String> {
        self.stages.ids()
    }

    /// Fire an event if a callback is set.
    pub(crate) fn emit(&self, event: PipelineEvent) {
        if let Some(ref cb) = self.on_event {
            cb(event);
        }
    }

    /// Run one convergence pass over `book`.
    ///
    /// Non-convergence is not an error: inspect `converged` on the outcome.
    /// On a stage failure the book is restored to its pre-run state and the
    /// version is left unchanged.
    pub fn upgrade(&mut self, book: &mut Book) -> Result<UpgradeOutcome, PipelineError> {
        if book.status() == Status::Published {
            return Err(PipelineError::AlreadyPublished {
                title: book.title().to_string(),
            });
        }

        let title = book.title().to_string();
        let checkpoint = book.checkpoint();
        let mut log = RunLog::default();

        self.emit(PipelineEvent::UpgradeStarted {
            title: title.clone(),
            version: book.version(),
        });

        let hooks = book.kind().hooks();
        self.run_hooks(book, &hooks, HookPhase::Before, &mut log);

        if let Err(e) = self.converge(book, &mut log) {
            book.restore(checkpoint);
            tracing::warn!(book = %title, "Upgrade abandoned: {}", e);
            self.emit(PipelineEvent::UpgradeFailed {
                title,
                error: e.to_string(),
            });
            return Err(e);
        }

        let version = book.bump_version();
        self.run_hooks(book, &hooks, HookPhase::After, &mut log);
        book.derived_mut()
            .extend_improvements(log.improvements.iter().cloned());

        let iterations = log.progression.len() as u32;
        let quality = book.quality();
        tracing::info!(
            book = %title,
            iterations,
            quality,
            converged = log.converged,
            "Upgrade complete",
        );
        self.emit(PipelineEvent::UpgradeCompleted {
            title: title.clone(),
            version,
            iterations,
            converged: log.converged,
            quality,
        });

        Ok(UpgradeOutcome {
            run_id: uuid::Uuid::new_v4().to_string(),
            title,
            iterations,
            final_quality: quality,
            converged: log.converged,
            version,
            status: book.status(),
            categories: categorize_improvements(&log.improvements),
            next_steps: next_steps(quality, self.config.threshold),
            quality_progression: log.progression,
            improvements: log.improvements,
            hooks_run: log.hooks_run,
            completed_at: Utc::now(),
        })
    }

    /// The bounded loop: stop at the threshold or when the budget runs out.
    fn converge(&mut self, book: &mut Book, log: &mut RunLog) -> Result<(), PipelineError> {
        let threshold = self.config.threshold;
        let max_iterations = self.config.max_iterations;
        let title = book.title().to_string();

        for iteration in 1..=max_iterations {
            self.emit(PipelineEvent::IterationStarted {
                title: title.clone(),
                iteration,
                max_iterations,
            });

            let (view, derived) = book.stage_parts(iteration);
            let round = self.stages.run_round(&view, derived)?;

            for (stage, score) in &round.scores {
                self.emit(PipelineEvent::StageScored {
                    title: title.clone(),
                    iteration,
                    stage: stage.clone(),
                    score: *score,
                });
            }

            let quality = round.mean();
            book.set_quality(quality);
            log.progression.push(quality);
            log.improvements.extend(round.improvements);
            tracing::debug!(book = %title, iteration, quality, "Iteration scored");
            self.emit(PipelineEvent::QualityUpdated {
                title: title.clone(),
                iteration,
                quality,
            });

            let from = book.status();
            let to = from.after_iteration(quality, threshold);
            if to != from {
                book.set_status(to);
                self.emit(PipelineEvent::StatusChanged {
                    title: title.clone(),
                    from,
                    to,
                });
            }

            if quality >= threshold {
                log.converged = true;
                break;
            }
        }
        Ok(())
    }

    fn run_hooks(
        &self,
        book: &mut Book,
        hooks: &[Box<dyn super::hooks::ExtraStage>],
        phase: HookPhase,
        log: &mut RunLog,
    ) {
        let title = book.title().to_string();
        let (view, derived) = book.stage_parts(0);
        let ran = run_extra_stages(hooks, phase, &view, derived);
        for hook in ran {
            log.hooks_run.push(hook.to_string());
            self.emit(PipelineEvent::HookRan {
                title: title.clone(),
                hook: hook.to_string(),
            });
        }
    }

    /// Publish gate with event reporting.
    pub fn publish(&self, book: &mut Book) -> PublishOutcome {
        let from = book.status();
        let outcome = book.publish();
        if outcome.is_rejected() {
            tracing::debug!(book = %book.title(), %outcome, "Publish refused");
        } else {
            self.emit(PipelineEvent::StatusChanged {
                title: book.title().to_string(),
                from,
                to: book.status(),
            });
        }
        self.emit(PipelineEvent::PublishResult {
            title: book.title().to_string(),
            outcome,
        });
        outcome
    }
}
