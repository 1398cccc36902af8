// src/core/book.rs — The work item: identity, quality state and lifecycle

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::{PublishOutcome, Status};
use crate::infra::errors::PipelineError;

/// Variant tag. Each variant carries its own construction parameters and
/// contributes extra stage hooks (see `core::hooks`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookKind {
    Standard,
    Children { target_age: u8 },
    Topical { topic: String },
}

impl BookKind {
    pub fn label(&self) -> &'static str {
        match self {
            BookKind::Standard => "standard",
            BookKind::Children { .. } => "children",
            BookKind::Topical { .. } => "topical",
        }
    }
}

/// Attributes stages and hooks are allowed to change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedAttributes {
    attributes: BTreeMap<String, String>,
    stage_passes: BTreeMap<String, u32>,
    improvements: Vec<String>,
}

impl DerivedAttributes {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn passes(&self, stage: &str) -> u32 {
        self.stage_passes.get(stage).copied().unwrap_or(0)
    }

    /// Count one more pass by `stage`; returns the new count.
    pub fn record_pass(&mut self, stage: &str) -> u32 {
        let count = self.stage_passes.entry(stage.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Improvement notes accumulated over every successful run.
    pub fn improvements(&self) -> &[String] {
        &self.improvements
    }

    pub(crate) fn extend_improvements(&mut self, notes: impl IntoIterator<Item = String>) {
        self.improvements.extend(notes);
    }
}

/// Read-only snapshot handed to stages and hooks.
#[derive(Debug, Clone, Copy)]
pub struct BookView<'a> {
    pub title: &'a str,
    pub author: &'a str,
    pub kind: &'a BookKind,
    pub quality: f32,
    pub version: u32,
    pub status: Status,
    /// 1-based iteration of the current run; 0 outside the loop.
    pub iteration: u32,
}

/// State restored when a run is abandoned.
#[derive(Debug, Clone)]
pub(crate) struct Checkpoint {
    quality: f32,
    status: Status,
    derived: DerivedAttributes,
}

#[derive(Debug, Clone, Serialize)]
pub struct Book {
    title: String,
    author: String,
    kind: BookKind,
    quality: f32,
    version: u32,
    status: Status,
    derived: DerivedAttributes,
}

impl Book {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Result<Self, PipelineError> {
        Self::with_kind(title, author, BookKind::Standard)
    }

    pub fn children(
        title: impl Into<String>,
        author: impl Into<String>,
        target_age: u8,
    ) -> Result<Self, PipelineError> {
        Self::with_kind(title, author, BookKind::Children { target_age })
    }

    pub fn topical(
        title: impl Into<String>,
        author: impl Into<String>,
        topic: impl Into<String>,
    ) -> Result<Self, PipelineError> {
        Self::with_kind(
            title,
            author,
            BookKind::Topical {
                topic: topic.into(),
            },
        )
    }

    pub fn with_kind(
        title: impl Into<String>,
        author: impl Into<String>,
        kind: BookKind,
    ) -> Result<Self, PipelineError> {
        let title = title.into();
        let author = author.into();
        let missing = |field: &str| PipelineError::MissingField {
            title: title.clone(),
            field: field.to_string(),
        };
        if title.trim().is_empty() {
            return Err(missing("title"));
        }
        if author.trim().is_empty() {
            return Err(missing("author"));
        }
        if let BookKind::Topical { topic } = &kind {
            if topic.trim().is_empty() {
                return Err(missing("topic"));
            }
        }
        Ok(Self {
            title,
            author,
            kind,
            quality: 0.0,
            version: 1,
            status: Status::Draft,
            derived: DerivedAttributes::default(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn kind(&self) -> &BookKind {
        &self.kind
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn derived(&self) -> &DerivedAttributes {
        &self.derived
    }

    /// Split into the read-only view and the only part stages may write.
    pub fn stage_parts(&mut self, iteration: u32) -> (BookView<'_>, &mut DerivedAttributes) {
        let view = BookView {
            title: &self.title,
            author: &self.author,
            kind: &self.kind,
            quality: self.quality,
            version: self.version,
            status: self.status,
            iteration,
        };
        (view, &mut self.derived)
    }

    /// Publish gate. Only a `Perfect` book moves; everything else is refused
    /// without a state change.
    pub fn publish(&mut self) -> PublishOutcome {
        match self.status {
            Status::Perfect => {
                self.status = Status::Published;
                PublishOutcome::Published
            }
            Status::Published => PublishOutcome::AlreadyPublished,
            Status::Draft | Status::InProgress => PublishOutcome::NotEligible,
        }
    }

    pub(crate) fn set_quality(&mut self, quality: f32) {
        self.quality = quality;
    }

    pub(crate) fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    pub(crate) fn bump_version(&mut self) -> u32 {
        self.version += 1;
        self.version
    }

    pub(crate) fn derived_mut(&mut self) -> &mut DerivedAttributes {
        &mut self.derived
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            quality: self.quality,
            status: self.status,
            derived: self.derived.clone(),
        }
    }

    pub(crate) fn restore(&mut self, checkpoint: Checkpoint) {
        self.quality = checkpoint.quality;
        self.status = checkpoint.status;
        self.derived = checkpoint.derived;
    }
}

/// Catalog entry as it appears in config. Fields are checked for presence
/// only when the book is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_age: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl BookEntry {
    pub fn build(&self) -> Result<Book, PipelineError> {
        let missing = |field: &str| PipelineError::MissingField {
            title: self.title.clone(),
            field: field.to_string(),
        };
        let kind = match self.kind.as_deref().unwrap_or("standard") {
            "standard" => BookKind::Standard,
            "children" => BookKind::Children {
                target_age: self.target_age.ok_or_else(|| missing("target_age"))?,
            },
            "topical" => BookKind::Topical {
                topic: self.topic.clone().ok_or_else(|| missing("topic"))?,
            },
            other => {
                return Err(PipelineError::InvalidConfiguration(format!(
                    "unknown book kind '{other}' for '{}'",
                    self.title
                )))
            }
        };
        Book::with_kind(self.title.clone(), self.author.clone(), kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ─── Construction ───────────────────────────────────────────

    #[test]
    fn test_new_book_initial_state() {
        let b = Book::new("The Lighthouse", "M. Rossi").unwrap();
        assert_eq!(b.title(), "The Lighthouse");
        assert_eq!(b.author(), "M. Rossi");
        assert_eq!(b.status(), Status::Draft);
        assert_eq!(b.quality(), 0.0);
        assert_eq!(b.version(), 1);
        assert_eq!(b.kind(), &BookKind::Standard);
        assert!(b.derived().improvements().is_empty());
    }

    #[test]
    fn test_missing_identity_rejected() {
        assert!(matches!(
            Book::new("", "A"),
            Err(PipelineError::MissingField { ref field, .. }) if field == "title"
        ));
        assert!(matches!(
            Book::new("T", "  "),
            Err(PipelineError::MissingField { ref field, .. }) if field == "author"
        ));
        assert!(Book::topical("T", "A", "").is_err());
    }

    #[test]
    fn test_variant_constructors() {
        let c = Book::children("Moon", "A", 6).unwrap();
        assert_eq!(c.kind(), &BookKind::Children { target_age: 6 });
        assert_eq!(c.kind().label(), "children");
        let t = Book::topical("Seas", "A", "ocean").unwrap();
        assert_eq!(t.kind().label(), "topical");
    }

    // ─── Derived attributes ─────────────────────────────────────

    #[test]
    fn test_derived_attributes_and_passes() {
        let mut d = DerivedAttributes::default();
        d.set("reading_level", "picture-book");
        d.set("keywords", "moon,night");
        d.set("reading_level", "early-reader");
        let keys: Vec<&str> = d.attributes().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["keywords", "reading_level"]);
        assert_eq!(d.get("reading_level"), Some("early-reader"));

        assert_eq!(d.passes("external-review"), 0);
        assert_eq!(d.record_pass("external-review"), 1);
        assert_eq!(d.record_pass("external-review"), 2);
        assert_eq!(d.passes("external-review"), 2);
    }

    // ─── Publish gate ───────────────────────────────────────────

    #[test]
    fn test_publish_draft_not_eligible() {
        let mut b = Book::new("T", "A").unwrap();
        assert_eq!(b.publish(), PublishOutcome::NotEligible);
        assert_eq!(b.status(), Status::Draft);
    }

    #[test]
    fn test_publish_perfect_once() {
        let mut b = Book::new("T", "A").unwrap();
        b.set_status(Status::Perfect);
        assert_eq!(b.publish(), PublishOutcome::Published);
        assert_eq!(b.status(), Status::Published);
        let again = b.publish();
        assert_eq!(again, PublishOutcome::AlreadyPublished);
        assert!(again.is_rejected());
        assert_eq!(b.status(), Status::Published);
    }

    #[test]
    fn test_publish_in_progress_not_eligible() {
        let mut b = Book::new("T", "A").unwrap();
        b.set_status(Status::InProgress);
        assert_eq!(b.publish(), PublishOutcome::NotEligible);
        assert_eq!(b.status(), Status::InProgress);
    }

    // ─── Checkpoint ─────────────────────────────────────────────

    #[test]
    fn test_checkpoint_restore() {
        let mut b = Book::new("T", "A").unwrap();
        let cp = b.checkpoint();
        b.set_quality(7.0);
        b.set_status(Status::InProgress);
        b.derived_mut().set("k", "v");
        b.restore(cp);
        assert_eq!(b.quality(), 0.0);
        assert_eq!(b.status(), Status::Draft);
        assert_eq!(b.derived().get("k"), None);
    }

    // ─── BookEntry ───────────────────────────────────────────────

    #[test]
    fn test_entry_defaults_to_standard() {
        let entry = BookEntry {
            title: "T".into(),
            author: "A".into(),
            ..Default::default()
        };
        assert_eq!(entry.build().unwrap().kind(), &BookKind::Standard);
    }

    #[test]
    fn test_entry_children_requires_age() {
        let entry = BookEntry {
            title: "T".into(),
            author: "A".into(),
            kind: Some("children".into()),
            ..Default::default()
        };
        let err = entry.build().unwrap_err();
        assert!(matches!(err, PipelineError::MissingField { ref field, .. } if field == "target_age"));
    }

    #[test]
    fn test_entry_unknown_kind() {
        let entry = BookEntry {
            title: "T".into(),
            author: "A".into(),
            kind: Some("comic".into()),
            ..Default::default()
        };
        assert!(matches!(
            entry.build(),
            Err(PipelineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_entry_missing_author() {
        let entry = BookEntry {
            title: "T".into(),
            ..Default::default()
        };
        assert!(matches!(
            entry.build(),
            Err(PipelineError::MissingField { ref field, .. }) if field == "author"
        ));
    }
}
