// src/digest/types.rs
use serde::Serialize;

/// An entry after title cleaning and timestamp normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedItem {
    pub title: String,
    pub source: String,
    pub link: String,
    /// Display date (feed string, or `ts` when the feed gave none).
    pub published: String,
    /// Canonical sortable timestamp.
    pub ts: String,
}

/// A headline believed to describe an incident at `org`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentCandidate {
    pub item: NormalizedItem,
    /// Human-readable org name, 2..=80 chars.
    pub org: String,
    /// Comparison key. Internal only; never serialized.
    pub org_norm: String,
}
