// src/digest/timestamp.rs
use crate::ingest::types::RawEntry;
use chrono::{DateTime, Utc};

/// `YYYY-MM-DDTHH:MM:SSZ`, UTC, second precision. Fixed width, so string
/// order equals chronological order.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn format_canonical(at: DateTime<Utc>) -> String {
    at.format(CANONICAL_FORMAT).to_string()
}

/// Canonical sortable timestamp for an entry. Structured `published` wins,
/// then structured `updated`, then the run instant `now`. The free-text date
/// strings are never parsed here.
pub fn canonical_ts(entry: &RawEntry, now: DateTime<Utc>) -> String {
    let at = entry
        .published_parsed
        .or(entry.updated_parsed)
        .unwrap_or(now);
    format_canonical(at)
}

/// Display date: the feed's own string when non-blank, else the canonical ts.
pub fn display_published(entry: &RawEntry, ts: &str) -> String {
    [entry.published.as_deref(), entry.updated.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| ts.to_string())
}
