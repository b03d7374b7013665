// src/digest/extract.rs
//! Best-guess organization name from a free-text headline.
//!
//! Rules are an ordered list of `(name, pattern)` pairs. For each rule the
//! candidate is the text before the first pattern match; the first rule whose
//! candidate is a plausible name (2..=80 chars after trimming) wins. Order:
//!
//! 1. `colon`     – before the first `:`
//! 2. `dash`      – before a spaced en-dash, em-dash or hyphen
//! 3. `pipe`      – before the first `|`
//! 4. `keyword`   – before the first extract keyword ("data breach", "hacked", ...)
//! 5. `verb`      – before the first whole-word reporting verb ("confirms", ...)
//!
//! Nothing plausible → first five whitespace tokens of the cleaned title.

use crate::digest::vocab::Vocabulary;
use regex::Regex;

pub const ORG_MIN_CHARS: usize = 2;
pub const ORG_MAX_CHARS: usize = 80;
const FALLBACK_TOKENS: usize = 5;

const QUOTE_CHARS: &[char] = &[
    '"', '\'', '`', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}', '\u{00AB}', '\u{00BB}',
];
const TRAILING_SEPARATORS: &[char] = &[':', '-', '\u{2013}', '\u{2014}', '|', ',', ';'];

#[derive(Debug, Clone)]
pub struct ExtractionRule {
    pub name: &'static str,
    pattern: Regex,
}

impl ExtractionRule {
    fn new(name: &'static str, pattern: Regex) -> Self {
        Self { name, pattern }
    }

    /// Trimmed text before the first match, if any and if plausible.
    pub fn apply<'a>(&self, cleaned: &'a str) -> Option<&'a str> {
        let m = self.pattern.find(cleaned)?;
        let candidate = trim_candidate(&cleaned[..m.start()]);
        is_plausible(candidate).then_some(candidate)
    }
}

/// Result of running the cascade on one title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub org: String,
    /// Winning rule name; `None` when the token fallback was used.
    pub rule: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct OrgExtractor {
    rules: Vec<ExtractionRule>,
}

impl OrgExtractor {
    pub fn new(vocab: &Vocabulary) -> Self {
        let mut rules = vec![
            ExtractionRule::new("colon", Regex::new(":").unwrap()),
            ExtractionRule::new("dash", Regex::new(r"\s[-\u{2013}\u{2014}]\s").unwrap()),
            ExtractionRule::new("pipe", Regex::new(r"\|").unwrap()),
        ];
        if let Some(re) = alternation(&vocab.extract_keywords, false) {
            rules.push(ExtractionRule::new("keyword", re));
        }
        if let Some(re) = alternation(&vocab.reporting_verbs, true) {
            rules.push(ExtractionRule::new("verb", re));
        }
        Self { rules }
    }

    pub fn rules(&self) -> &[ExtractionRule] {
        &self.rules
    }

    pub fn extract(&self, title: &str) -> String {
        self.extract_with_rule(title).org
    }

    pub fn extract_with_rule(&self, title: &str) -> Extraction {
        let cleaned = strip_quotes(title);

        for rule in &self.rules {
            if let Some(org) = rule.apply(&cleaned) {
                return Extraction {
                    org: org.to_string(),
                    rule: Some(rule.name),
                };
            }
        }

        Extraction {
            org: fallback_tokens(&cleaned),
            rule: None,
        }
    }
}

pub fn is_plausible(s: &str) -> bool {
    (ORG_MIN_CHARS..=ORG_MAX_CHARS).contains(&s.chars().count())
}

fn strip_quotes(title: &str) -> String {
    title.chars().filter(|c| !QUOTE_CHARS.contains(c)).collect()
}

fn trim_candidate(s: &str) -> &str {
    s.trim_end_matches(|c: char| c.is_whitespace() || TRAILING_SEPARATORS.contains(&c))
        .trim_start()
}

fn fallback_tokens(cleaned: &str) -> String {
    let joined = cleaned
        .split_whitespace()
        .take(FALLBACK_TOKENS)
        .collect::<Vec<_>>()
        .join(" ");
    if joined.chars().count() > ORG_MAX_CHARS {
        joined
            .chars()
            .take(ORG_MAX_CHARS)
            .collect::<String>()
            .trim_end()
            .to_string()
    } else {
        joined
    }
}

/// Case-insensitive alternation over literal phrases; inner spaces match any
/// whitespace run. `None` for an empty list.
fn alternation(phrases: &[String], whole_words: bool) -> Option<Regex> {
    let alts: Vec<String> = phrases
        .iter()
        .filter(|p| !p.trim().is_empty())
        .map(|p| {
            p.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect();
    if alts.is_empty() {
        return None;
    }
    let body = alts.join("|");
    let pattern = if whole_words {
        format!(r"(?i)\b(?:{body})\b")
    } else {
        format!(r"(?i)(?:{body})")
    };
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(error = %e, "skipping extraction rule with invalid vocabulary");
            None
        }
    }
}
