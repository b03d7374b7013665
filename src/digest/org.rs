// src/digest/org.rs
//! Organization key normalization: lowercase, strip punctuation, drop
//! corporate suffixes, collapse whitespace.

use crate::digest::vocab::Vocabulary;

/// Canonical comparison key for an extracted organization name.
///
/// `.` is deleted rather than spaced so dotted suffixes ("Corp.", "L.L.C.",
/// "S.A.") collapse to their plain form; every other non-alphanumeric,
/// non-whitespace char becomes a space. Idempotent.
pub fn normalize_org(name: &str, vocab: &Vocabulary) -> String {
    let lowered = name.to_lowercase();
    let mut cleaned = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        if ch == '.' {
            continue;
        }
        if ch.is_alphanumeric() || ch.is_whitespace() {
            cleaned.push(ch);
        } else {
            cleaned.push(' ');
        }
    }

    cleaned
        .split_whitespace()
        .filter(|tok| !vocab.is_suffix(tok))
        .collect::<Vec<_>>()
        .join(" ")
}
