// src/core/coordinator.rs — Phase sequencing over a collection

use serde::Serialize;

use super::collection::{BatchReport, Collection, CollectionMetrics, PublishRecord};
use super::engine::UpgradeEngine;
use super::types::{MetricsPhase, PipelineEvent};

/// Everything `dominate` produced, phase by phase.
#[derive(Debug, Clone, Serialize)]
pub struct DominationReport {
    pub upgrade: BatchReport,
    pub after_upgrade: CollectionMetrics,
    pub published: Vec<PublishRecord>,
    pub after_publish: CollectionMetrics,
}

pub struct Coordinator {
    engine: UpgradeEngine,
    collection: Collection,
}

impl Coordinator {
    pub fn new(engine: UpgradeEngine, collection: Collection) -> Self {
        Self { engine, collection }
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn engine(&self) -> &UpgradeEngine {
        &self.engine
    }

    pub fn into_collection(self) -> Collection {
        self.collection
    }

    /// upgrade all → metrics → publish eligible → metrics.
    ///
    /// Each phase finishes before the next starts.
    pub fn dominate(&mut self) -> DominationReport {
        tracing::info!(books = self.collection.len(), "Upgrading collection");
        let upgrade = self.collection.upgrade_all(&mut self.engine);
        let after_upgrade = self.snapshot(MetricsPhase::AfterUpgrade);

        let published = self.collection.publish_all(&self.engine);
        let after_publish = self.snapshot(MetricsPhase::AfterPublish);

        DominationReport {
            upgrade,
            after_upgrade,
            published,
            after_publish,
        }
    }

    fn snapshot(&self, phase: MetricsPhase) -> CollectionMetrics {
        let metrics = self.collection.metrics();
        self.engine.emit(PipelineEvent::MetricsSnapshot {
            phase,
            metrics: metrics.clone(),
        });
        metrics
    }
}
