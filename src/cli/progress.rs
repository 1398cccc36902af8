// src/cli/progress.rs — Terminal renderer for pipeline events

use crate::core::collection::CollectionMetrics;
use crate::core::types::PipelineEvent;

/// Build an event callback that writes formatted lines to stderr.
///
/// Progress goes to stderr so stdout carries only the final report.
/// Returns a closure suitable for `UpgradeEngine::with_events()`.
pub fn terminal_progress() -> impl Fn(PipelineEvent) + Send + 'static {
    move |event| eprintln!("{}", render(&event))
}

/// One-line rendering of metrics, `no data` for an empty collection.
pub fn render_metrics(m: &CollectionMetrics) -> String {
    match m.summary {
        Some(s) => format!(
            "total={} perfect={} published={} mean={:.2} success={:.2}%",
            m.total,
            m.perfect,
            m.published,
            s.mean_quality,
            s.success_percent(),
        ),
        None => format!("total={} no data", m.total),
    }
}

pub fn render(event: &PipelineEvent) -> String {
    match event {
        PipelineEvent::UpgradeStarted { title, version } => {
            format!("[{}] upgrading v{}", title, version)
        }
        PipelineEvent::IterationStarted {
            title,
            iteration,
            max_iterations,
        } => format!("[{}] iter {}/{}", title, iteration, max_iterations),
        PipelineEvent::StageScored {
            title,
            stage,
            score,
            ..
        } => format!("[{}]   {:<22} {:.2}", title, stage, score),
        PipelineEvent::QualityUpdated {
            title,
            iteration,
            quality,
        } => format!("[{}] iter {} quality={:.2}/10", title, iteration, quality),
        PipelineEvent::StatusChanged { title, from, to } => {
            format!("[{}] status {} -> {}", title, from, to)
        }
        PipelineEvent::HookRan { title, hook } => format!("[{}]   hook: {}", title, hook),
        PipelineEvent::UpgradeCompleted {
            title,
            version,
            iterations,
            converged,
            quality,
        } => format!(
            "[{}] done v{} quality={:.2} iterations={} {}",
            title,
            version,
            quality,
            iterations,
            if *converged { "converged" } else { "below threshold" },
        ),
        PipelineEvent::UpgradeFailed { title, error } => {
            format!("[{}] upgrade failed: {}", title, error)
        }
        PipelineEvent::PublishResult { title, outcome } => {
            format!("[{}] publish: {}", title, outcome)
        }
        PipelineEvent::MetricsSnapshot { phase, metrics } => {
            format!("[metrics {}] {}", phase, render_metrics(metrics))
        }
    }
}
