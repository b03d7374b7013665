// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One headline as produced by the feed parsers. Every field is optional in
/// practice; empty strings stand in for "absent".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawEntry {
    pub title: String,
    pub link: String,
    /// Free-text date exactly as the feed wrote it (display only).
    pub published: Option<String>,
    pub updated: Option<String>,
    /// Structured time values, when the parser could decode the strings above.
    pub published_parsed: Option<DateTime<Utc>>,
    pub updated_parsed: Option<DateTime<Utc>>,
}

impl RawEntry {
    /// Convenience for tests and fixtures: a titled entry with no dates.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_published(mut self, at: DateTime<Utc>) -> Self {
        self.published = Some(at.to_rfc2822());
        self.published_parsed = Some(at);
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }
}

/// Whether a source is a dedicated breach feed or a general news feed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Incident,
    #[default]
    General,
}

/// Entries contributed by one source during one run, in feed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBatch {
    pub source_name: String,
    pub kind: SourceKind,
    pub entries: Vec<RawEntry>,
}

impl SourceBatch {
    pub fn new(source_name: impl Into<String>, kind: SourceKind, entries: Vec<RawEntry>) -> Self {
        Self {
            source_name: source_name.into(),
            kind,
            entries,
        }
    }

    pub fn empty(source_name: impl Into<String>, kind: SourceKind) -> Self {
        Self::new(source_name, kind, Vec::new())
    }
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<SourceBatch>;
    fn name(&self) -> &str;
    fn kind(&self) -> SourceKind;
}
