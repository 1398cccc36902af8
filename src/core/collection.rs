// src/core/collection.rs — Ordered set of books with batch operations

use serde::Serialize;

use super::book::Book;
use super::engine::UpgradeEngine;
use super::types::{PublishOutcome, Status, UpgradeOutcome};

/// Mean quality and success rate. Absent when the collection is empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualitySummary {
    pub mean_quality: f64,
    /// Fraction in `[0, 1]`: perfect / total.
    pub success_rate: f64,
}

impl QualitySummary {
    pub fn success_percent(&self) -> f64 {
        self.success_rate * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionMetrics {
    pub total: usize,
    pub perfect: usize,
    pub published: usize,
    /// `None` means "no data".
    pub summary: Option<QualitySummary>,
}

/// A book whose upgrade failed during a batch.
#[derive(Debug, Clone, Serialize)]
pub struct ItemFailure {
    pub index: usize,
    pub title: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<UpgradeOutcome>,
    /// Titles of published books left untouched.
    pub skipped: Vec<String>,
    pub failures: Vec<ItemFailure>,
}

impl BatchReport {
    pub fn converged(&self) -> usize {
        self.outcomes.iter().filter(|o| o.converged).count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishRecord {
    pub title: String,
    pub outcome: PublishOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct Collection {
    books: Vec<Book>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, book: Book) {
        self.books.push(book);
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn get(&self, index: usize) -> Option<&Book> {
        self.books.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Book> {
        self.books.get_mut(index)
    }

    /// Upgrade every book in order. A failure is recorded and the batch goes on.
    pub fn upgrade_all(&mut self, engine: &mut UpgradeEngine) -> BatchReport {
        let mut report = BatchReport::default();
        for (index, book) in self.books.iter_mut().enumerate() {
            if book.status() == Status::Published {
                report.skipped.push(book.title().to_string());
                continue;
            }
            match engine.upgrade(book) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e) => {
                    if !e.is_item_scoped() {
                        tracing::error!(book = %book.title(), "Unexpected upgrade error: {}", e);
                    }
                    report.failures.push(ItemFailure {
                        index,
                        title: book.title().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }
        report
    }

    /// Publish every book currently `Perfect`; the rest are not touched.
    pub fn publish_all(&mut self, engine: &UpgradeEngine) -> Vec<PublishRecord> {
        self.books
            .iter_mut()
            .filter(|b| b.status() == Status::Perfect)
            .map(|book| PublishRecord {
                title: book.title().to_string(),
                outcome: engine.publish(book),
            })
            .collect()
    }

    pub fn metrics(&self) -> CollectionMetrics {
        let total = self.books.len();
        let count = |status: Status| self.books.iter().filter(|b| b.status() == status).count();
        let perfect = count(Status::Perfect);
        let published = count(Status::Published);

        let summary = (total > 0).then(|| QualitySummary {
            mean_quality: self.books.iter().map(|b| b.quality() as f64).sum::<f64>()
                / total as f64,
            success_rate: perfect as f64 / total as f64,
        });

        CollectionMetrics {
            total,
            perfect,
            published,
            summary,
        }
    }
}

impl FromIterator<Book> for Collection {
    fn from_iter<I: IntoIterator<Item = Book>>(iter: I) -> Self {
        Self {
            books: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PipelineConfig;
    use crate::evaluator::scripted::ScriptedStage;
    use crate::evaluator::StagePipeline;

    fn engine_with(scores: Vec<Result<f32, String>>) -> UpgradeEngine {
        let cfg = PipelineConfig {
            max_iterations: 1,
            ..Default::default()
        };
        let stage = ScriptedStage::from_results("s", scores);
        UpgradeEngine::with_stages(cfg, StagePipeline::new(vec![Box::new(stage)]).unwrap())
            .unwrap()
    }

    fn three_books() -> Collection {
        ["One", "Two", "Three"]
            .into_iter()
            .map(|t| Book::new(t, "A").unwrap())
            .collect()
    }

    #[test]
    fn test_empty_metrics_no_data() {
        let c = Collection::new();
        let m = c.metrics();
        assert_eq!(m.total, 0);
        assert_eq!(m.perfect, 0);
        assert!(m.summary.is_none());
    }

    #[test]
    fn test_upgrade_all_two_of_three() {
        let mut c = three_books();
        let mut e = engine_with(vec![Ok(10.0), Ok(9.8), Ok(6.0)]);
        let report = c.upgrade_all(&mut e);
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.converged(), 2);

        let m = c.metrics();
        assert_eq!(m.total, 3);
        assert_eq!(m.perfect, 2);
        let s = m.summary.unwrap();
        assert!((s.success_percent() - 66.666_67).abs() < 0.01);
        assert!((s.mean_quality - (10.0 + 9.8 + 6.0) / 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_failure_does_not_stop_siblings() {
        let mut c = three_books();
        let mut e = engine_with(vec![Ok(10.0), Err("boom".into()), Ok(10.0)]);
        let report = c.upgrade_all(&mut e);
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(report.failures[0].title, "Two");
        assert_eq!(c.get(1).unwrap().version(), 1);
        assert_eq!(c.get(2).unwrap().status(), Status::Perfect);
    }

    #[test]
    fn test_publish_all_only_perfect() {
        let mut c = three_books();
        let mut e = engine_with(vec![Ok(10.0), Ok(2.0), Ok(10.0)]);
        c.upgrade_all(&mut e);
        let records = c.publish_all(&e);
        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Three"]);
        assert!(records.iter().all(|r| r.outcome == PublishOutcome::Published));
        assert_eq!(c.get(1).unwrap().status(), Status::InProgress);

        let m = c.metrics();
        assert_eq!(m.published, 2);
        assert_eq!(m.perfect, 0);
        assert_eq!(m.summary.unwrap().success_rate, 0.0);
    }

    #[test]
    fn test_upgrade_all_skips_published() {
        let mut c = three_books();
        let mut e = engine_with(vec![Ok(10.0)]);
        c.upgrade_all(&mut e);
        c.publish_all(&e);
        let report = c.upgrade_all(&mut e);
        assert_eq!(report.skipped, vec!["One", "Two", "Three"]);
        assert!(report.outcomes.is_empty());
        assert!(c.books().iter().all(|b| b.version() == 2));
    }

    #[test]
    fn test_insertion_order_and_duplicates_kept() {
        let mut c = Collection::new();
        c.push(Book::new("Same", "A").unwrap());
        c.push(Book::new("Same", "A").unwrap());
        assert_eq!(c.len(), 2);
        assert!(!c.is_empty());
        c.get_mut(0).unwrap().set_quality(1.0);
        assert_eq!(c.books()[0].quality(), 1.0);
        assert_eq!(c.books()[1].quality(), 0.0);
    }
}
