// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod scheduler;
pub mod types;

use crate::ingest::types::{SourceBatch, SourceProvider};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

/// Longest title (in chars) kept after cleaning.
pub const TITLE_MAX_CHARS: usize = 300;

/// One-time metrics registration (so series show up in the exposition text).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("digest_entries_total", "Entries parsed from feeds.");
        describe_counter!(
            "digest_untitled_dropped_total",
            "Entries dropped because no usable title remained."
        );
        describe_counter!(
            "digest_actor_rejected_total",
            "Incident candidates rejected as threat-actor mentions."
        );
        describe_counter!(
            "digest_provider_errors_total",
            "Feed fetch/parse errors."
        );
        describe_counter!(
            "digest_breaches_emitted_total",
            "Breach records written to the digest."
        );
        describe_counter!(
            "digest_rss_emitted_total",
            "General news records written to the digest."
        );
        describe_counter!(
            "digest_placeholder_total",
            "Runs where a list had to be seeded with placeholders."
        );
        describe_counter!("digest_runs_total", "Scheduled digest runs.");
        describe_histogram!("digest_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("digest_last_run_ts", "Unix ts when the digest last ran.");
    });
}

/// Clean a feed title: decode entities, strip tags, fold smart quotes,
/// collapse whitespace, cap length.
pub fn clean_title(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Length cap
    if out.chars().count() > TITLE_MAX_CHARS {
        out = out.chars().take(TITLE_MAX_CHARS).collect();
        out = out.trim_end().to_string();
    }

    out
}

/// Fetch every provider once, in order. A failing provider is logged and
/// contributes an empty batch; it never aborts the run.
pub async fn run_once(providers: &[Box<dyn SourceProvider>]) -> Vec<SourceBatch> {
    ensure_metrics_described();

    let mut batches = Vec::with_capacity(providers.len());
    for p in providers {
        match p.fetch_latest().await {
            Ok(batch) => {
                tracing::debug!(source = %batch.source_name, entries = batch.entries.len(), "source fetched");
                batches.push(batch);
            }
            Err(e) => {
                tracing::warn!(error = ?e, source = p.name(), "source failed, contributing nothing");
                counter!("digest_provider_errors_total").increment(1);
                batches.push(SourceBatch::empty(p.name(), p.kind()));
            }
        }
    }
    batches
}
