// src/digest/mod.rs
//! Digest pipeline: source batches in, `Digest` out.
//!
//! Per batch, in configuration order:
//! 1) clean titles, drop untitled entries, normalize timestamps
//! 2) incident path: dedicated incident feeds (every entry) plus keyword
//!    matches from general feeds → extract org → normalize key → actor filter
//! 3) general path (general feeds only): drop keyword matches
//! 4) per-source cap on both paths
//!
//! Then: latest-per-org and first-per-title dedup, recency sort, total cap,
//! placeholders for empty lists. Pure and synchronous; never fails.

pub mod assemble;
pub mod dedup;
pub mod extract;
pub mod org;
pub mod timestamp;
pub mod types;
pub mod vocab;

use crate::ingest::clean_title;
use crate::ingest::types::{RawEntry, SourceBatch, SourceKind};
use chrono::{DateTime, Utc};
use metrics::{counter, gauge};

pub use crate::digest::assemble::{BreachRecord, Digest, Limits, NewsRecord};
pub use crate::digest::extract::OrgExtractor;
pub use crate::digest::types::{IncidentCandidate, NormalizedItem};
pub use crate::digest::vocab::Vocabulary;

/// Counts gathered during one `build` call (for logs and tests).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub entries: usize,
    pub untitled: usize,
    pub candidates: usize,
    pub rejected_org: usize,
    pub rejected_actor: usize,
    pub org_dupes: usize,
    pub title_dupes: usize,
}

#[derive(Debug, Clone)]
pub struct DigestEngine {
    vocab: Vocabulary,
    extractor: OrgExtractor,
    limits: Limits,
}

impl DigestEngine {
    pub fn new(vocab: Vocabulary, limits: Limits) -> Self {
        let vocab = vocab.sanitized();
        let extractor = OrgExtractor::new(&vocab);
        Self {
            vocab,
            extractor,
            limits: limits.sanitized(),
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn build(&self, batches: &[SourceBatch], now: DateTime<Utc>) -> Digest {
        self.build_with_stats(batches, now).0
    }

    pub fn build_with_stats(&self, batches: &[SourceBatch], now: DateTime<Utc>) -> (Digest, RunStats) {
        crate::ingest::ensure_metrics_described();

        let now_ts = timestamp::format_canonical(now);
        let mut stats = RunStats::default();
        let mut candidates: Vec<IncidentCandidate> = Vec::new();
        let mut general: Vec<NormalizedItem> = Vec::new();

        for batch in batches {
            let items = self.normalize_batch(batch, now, &mut stats);

            let mut batch_candidates = Vec::new();
            let mut batch_general = Vec::new();
            for it in items {
                let incident_like = self.vocab.is_incident_title(&it.title);
                if batch.kind == SourceKind::General && !incident_like {
                    batch_general.push(it);
                    continue;
                }
                if let Some(c) = self.candidate(it, &mut stats) {
                    batch_candidates.push(c);
                }
            }

            stats.candidates += batch_candidates.len();
            candidates.extend(assemble::cap_per_source(batch_candidates, &self.limits));
            general.extend(assemble::cap_per_source(batch_general, &self.limits));
        }

        let candidate_count = candidates.len();
        let groups = dedup::latest_by_org(candidates);
        stats.org_dupes = candidate_count - groups.len();
        let (general, title_dupes) = dedup::first_by_title(general);
        stats.title_dupes = title_dupes;

        let breaches = assemble::assemble_breaches(groups, &self.limits, &now_ts);
        let rss = assemble::assemble_rss(general, &self.limits, &now_ts);

        counter!("digest_entries_total").increment(stats.entries as u64);
        counter!("digest_untitled_dropped_total").increment(stats.untitled as u64);
        counter!("digest_actor_rejected_total").increment(stats.rejected_actor as u64);
        counter!("digest_breaches_emitted_total").increment(breaches.len() as u64);
        counter!("digest_rss_emitted_total").increment(rss.len() as u64);
        gauge!("digest_last_run_ts").set(now.timestamp() as f64);

        tracing::info!(
            target: "digest",
            sources = batches.len(),
            entries = stats.entries,
            untitled = stats.untitled,
            candidates = stats.candidates,
            org_rejected = stats.rejected_org,
            actor_rejected = stats.rejected_actor,
            org_dupes = stats.org_dupes,
            title_dupes = stats.title_dupes,
            breaches = breaches.len(),
            rss = rss.len(),
            "digest built"
        );

        let digest = Digest {
            generated_at: now_ts,
            breaches,
            rss,
            summary: assemble::SUMMARY.to_string(),
        };
        (digest, stats)
    }

    /// Clean titles and attach timestamps; untitled entries are dropped.
    fn normalize_batch(
        &self,
        batch: &SourceBatch,
        now: DateTime<Utc>,
        stats: &mut RunStats,
    ) -> Vec<NormalizedItem> {
        let mut out = Vec::with_capacity(batch.entries.len());
        for entry in &batch.entries {
            stats.entries += 1;
            match normalize_entry(entry, &batch.source_name, now) {
                Some(it) => out.push(it),
                None => stats.untitled += 1,
            }
        }
        out
    }

    /// Extract → normalize → actor filter. `None` when the item cannot be
    /// attributed to a plausible, non-actor organization.
    pub fn candidate(&self, item: NormalizedItem, stats: &mut RunStats) -> Option<IncidentCandidate> {
        let extract::Extraction { org, rule } = self.extractor.extract_with_rule(&item.title);
        let rule = rule.unwrap_or("fallback");
        if !extract::is_plausible(&org) {
            tracing::debug!(title = %item.title, rule, "no plausible organization");
            stats.rejected_org += 1;
            return None;
        }
        let org_norm = org::normalize_org(&org, &self.vocab);
        if org_norm.is_empty() {
            tracing::debug!(%org, rule, "organization key empty after normalization");
            stats.rejected_org += 1;
            return None;
        }
        if self.vocab.is_actor(&org_norm) {
            tracing::debug!(%org, %org_norm, rule, "threat-actor mention rejected");
            stats.rejected_actor += 1;
            return None;
        }
        Some(IncidentCandidate {
            item,
            org,
            org_norm,
        })
    }

    pub fn extractor(&self) -> &OrgExtractor {
        &self.extractor
    }

    pub fn normalize_org(&self, name: &str) -> String {
        org::normalize_org(name, &self.vocab)
    }
}

impl Default for DigestEngine {
    fn default() -> Self {
        Self::new(Vocabulary::default_seed(), Limits::default())
    }
}

/// Title cleaning and timestamp normalization for one entry.
pub fn normalize_entry(entry: &RawEntry, source: &str, now: DateTime<Utc>) -> Option<NormalizedItem> {
    let title = clean_title(&entry.title);
    if title.is_empty() {
        return None;
    }
    let ts = timestamp::canonical_ts(entry, now);
    let published = timestamp::display_published(entry, &ts);
    Some(NormalizedItem {
        title,
        source: source.to_string(),
        link: entry.link.trim().to_string(),
        published,
        ts,
    })
}
