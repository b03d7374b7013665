// src/digest/dedup.rs
//! Latest-per-organization and first-per-title deduplication.

use crate::digest::types::{IncidentCandidate, NormalizedItem};
use std::collections::{HashMap, HashSet};

/// Keep one candidate per `org_norm`: the one with the greatest `ts`.
///
/// Tie-break: on equal `ts` the candidate encountered LAST wins. Callers feed
/// candidates in source-configuration order, then feed order, so the result
/// is deterministic. Groups come out in first-seen order.
pub fn latest_by_org<I>(candidates: I) -> Vec<IncidentCandidate>
where
    I: IntoIterator<Item = IncidentCandidate>,
{
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<IncidentCandidate> = Vec::new();

    for cand in candidates {
        match slots.get(&cand.org_norm).copied() {
            Some(idx) => {
                if cand.item.ts >= groups[idx].item.ts {
                    groups[idx] = cand;
                }
            }
            None => {
                slots.insert(cand.org_norm.clone(), groups.len());
                groups.push(cand);
            }
        }
    }

    groups
}

/// Keep the first item per exact title, preserving input order.
pub fn first_by_title<I>(items: I) -> (Vec<NormalizedItem>, usize)
where
    I: IntoIterator<Item = NormalizedItem>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut keep = Vec::new();
    let mut dropped = 0usize;

    for it in items {
        if !seen.insert(it.title.clone()) {
            dropped += 1;
            continue;
        }
        keep.push(it);
    }

    (keep, dropped)
}
