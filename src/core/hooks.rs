// src/core/hooks.rs — Per-variant extra stages run around the base loop
//
// Hooks only receive the read-only view and the derived attributes. They add
// side effects before or after a run and have no way to touch quality or
// status, so the threshold check stays with the base loop.

use super::book::{BookKind, BookView, DerivedAttributes};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    Before,
    After,
}

pub trait ExtraStage {
    fn id(&self) -> &'static str;
    fn phase(&self) -> HookPhase;
    fn run(&self, book: &BookView<'_>, derived: &mut DerivedAttributes);
}

impl BookKind {
    /// Ordered extra stages for this variant.
    pub fn hooks(&self) -> Vec<Box<dyn ExtraStage>> {
        match self {
            BookKind::Standard => Vec::new(),
            BookKind::Children { target_age } => vec![
                Box::new(AgeCalibration {
                    target_age: *target_age,
                }),
                Box::new(IllustrationPlan {
                    target_age: *target_age,
                }),
            ],
            BookKind::Topical { topic } => vec![
                Box::new(TopicEnrichment {
                    topic: topic.clone(),
                }),
                Box::new(SeriesTagging {
                    topic: topic.clone(),
                }),
            ],
        }
    }
}

/// Run every hook of `phase`, in order. Returns the ids that ran.
pub fn run_extra_stages(
    hooks: &[Box<dyn ExtraStage>],
    phase: HookPhase,
    book: &BookView<'_>,
    derived: &mut DerivedAttributes,
) -> Vec<&'static str> {
    let mut ran = Vec::new();
    for hook in hooks.iter().filter(|h| h.phase() == phase) {
        hook.run(book, derived);
        ran.push(hook.id());
    }
    ran
}

fn reading_level(age: u8) -> &'static str {
    match age {
        0..=5 => "picture-book",
        6..=8 => "early-reader",
        9..=12 => "middle-grade",
        _ => "young-adult",
    }
}

struct AgeCalibration {
    target_age: u8,
}

impl ExtraStage for AgeCalibration {
    fn id(&self) -> &'static str {
        "age-calibration"
    }

    fn phase(&self) -> HookPhase {
        HookPhase::Before
    }

    fn run(&self, _book: &BookView<'_>, derived: &mut DerivedAttributes) {
        derived.set("target_age", self.target_age.to_string());
        derived.set("reading_level", reading_level(self.target_age));
    }
}

struct IllustrationPlan {
    target_age: u8,
}

impl ExtraStage for IllustrationPlan {
    fn id(&self) -> &'static str {
        "illustration-plan"
    }

    fn phase(&self) -> HookPhase {
        HookPhase::After
    }

    fn run(&self, _book: &BookView<'_>, derived: &mut DerivedAttributes) {
        let plan = match reading_level(self.target_age) {
            "picture-book" => "full-page",
            "early-reader" => "spot",
            _ => "chapter-headers",
        };
        derived.set("illustrations", plan);
    }
}

struct TopicEnrichment {
    topic: String,
}

impl ExtraStage for TopicEnrichment {
    fn id(&self) -> &'static str {
        "topic-enrichment"
    }

    fn phase(&self) -> HookPhase {
        HookPhase::Before
    }

    fn run(&self, book: &BookView<'_>, derived: &mut DerivedAttributes) {
        let mut keywords: Vec<String> = self
            .topic
            .split_whitespace()
            .chain(book.title.split_whitespace())
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .filter(|w| w.len() > 2)
            .collect();
        keywords.sort();
        keywords.dedup();
        derived.set("keywords", keywords.join(","));
    }
}

struct SeriesTagging {
    topic: String,
}

impl ExtraStage for SeriesTagging {
    fn id(&self) -> &'static str {
        "series-tagging"
    }

    fn phase(&self) -> HookPhase {
        HookPhase::After
    }

    fn run(&self, _book: &BookView<'_>, derived: &mut DerivedAttributes) {
        derived.set("series", format!("{} collection", self.topic.trim()));
    }
}
