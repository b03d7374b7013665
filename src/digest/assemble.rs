// src/digest/assemble.rs
//! Caps, recency sort and placeholder seeding for the two output lists.

use crate::digest::types::{IncidentCandidate, NormalizedItem};
use serde::{Deserialize, Serialize};

pub const SUMMARY: &str = "Most recent breach or leak headline per affected organization, \
alongside cyber-security and OSINT news with breach-style headlines removed. \
Compiled from public RSS/Atom feeds.";

pub const PLACEHOLDER_SOURCE: &str = "placeholder";

fn default_per_feed() -> usize {
    20
}
fn default_total_cap() -> usize {
    30
}

/// Output caps.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Limits {
    /// Max entries any single source may contribute to a list, before merging.
    #[serde(default = "default_per_feed")]
    pub per_feed: usize,
    /// Max entries per list after sorting.
    #[serde(default = "default_total_cap")]
    pub total_cap: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            per_feed: default_per_feed(),
            total_cap: default_total_cap(),
        }
    }
}

impl Limits {
    /// Zero caps are coerced to 1.
    pub fn sanitized(self) -> Self {
        Self {
            per_feed: self.per_feed.max(1),
            total_cap: self.total_cap.max(1),
        }
    }
}

/// One entry of the `breaches` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreachRecord {
    pub org: String,
    pub title: String,
    pub source: String,
    pub link: String,
    pub published: String,
    pub ts: String,
}

impl From<IncidentCandidate> for BreachRecord {
    fn from(c: IncidentCandidate) -> Self {
        // org_norm is dropped here
        Self {
            org: c.org,
            title: c.item.title,
            source: c.item.source,
            link: c.item.link,
            published: c.item.published,
            ts: c.item.ts,
        }
    }
}

/// One entry of the `rss` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub title: String,
    pub source: String,
    pub link: String,
    pub published: String,
    pub ts: String,
}

impl From<NormalizedItem> for NewsRecord {
    fn from(it: NormalizedItem) -> Self {
        Self {
            title: it.title,
            source: it.source,
            link: it.link,
            published: it.published,
            ts: it.ts,
        }
    }
}

/// The dashboard data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    pub generated_at: String,
    pub breaches: Vec<BreachRecord>,
    pub rss: Vec<NewsRecord>,
    pub summary: String,
}

/// Truncate one source's contribution before merging.
pub fn cap_per_source<T>(mut items: Vec<T>, limits: &Limits) -> Vec<T> {
    items.truncate(limits.per_feed);
    items
}

/// Newest first (stable), truncate, seed placeholders when empty.
pub fn assemble_breaches(
    groups: Vec<IncidentCandidate>,
    limits: &Limits,
    now_ts: &str,
) -> Vec<BreachRecord> {
    let mut out: Vec<BreachRecord> = groups.into_iter().map(BreachRecord::from).collect();
    out.sort_by(|a, b| b.ts.cmp(&a.ts));
    out.truncate(limits.total_cap);
    if out.is_empty() {
        tracing::info!(list = "breaches", "no records, seeding placeholders");
        metrics::counter!("digest_placeholder_total").increment(1);
        out = placeholder_breaches(now_ts);
    }
    out
}

pub fn assemble_rss(items: Vec<NormalizedItem>, limits: &Limits, now_ts: &str) -> Vec<NewsRecord> {
    let mut out: Vec<NewsRecord> = items.into_iter().map(NewsRecord::from).collect();
    out.sort_by(|a, b| b.ts.cmp(&a.ts));
    out.truncate(limits.total_cap);
    if out.is_empty() {
        tracing::info!(list = "rss", "no records, seeding placeholders");
        metrics::counter!("digest_placeholder_total").increment(1);
        out = placeholder_rss(now_ts);
    }
    out
}

pub fn placeholder_breaches(now_ts: &str) -> Vec<BreachRecord> {
    ["ExampleCo", "ExampleOrg"]
        .into_iter()
        .map(|org| BreachRecord {
            org: org.to_string(),
            title: format!("[placeholder] No recent breach headlines yet ({org})"),
            source: PLACEHOLDER_SOURCE.to_string(),
            link: String::new(),
            published: now_ts.to_string(),
            ts: now_ts.to_string(),
        })
        .collect()
}

pub fn placeholder_rss(now_ts: &str) -> Vec<NewsRecord> {
    vec![NewsRecord {
        title: "[placeholder] No news items yet; will retry on the next update".to_string(),
        source: PLACEHOLDER_SOURCE.to_string(),
        link: String::new(),
        published: now_ts.to_string(),
        ts: now_ts.to_string(),
    }]
}

pub fn is_placeholder_source(source: &str) -> bool {
    source == PLACEHOLDER_SOURCE
}
