//! # Vocabulary
//!
//! Closed, hand-maintained word lists that drive the digest heuristics:
//!
//! - `actors`: threat-actor / ransomware-group tokens. A normalized org key
//!   containing one of these tokens is a perpetrator mention, not a victim.
//! - `suffixes`: corporate suffix words dropped from org keys.
//! - `breach_keywords`: terms that mark a headline as incident-like.
//! - `extract_keywords`: terms whose prefix is taken as the org name.
//! - `reporting_verbs`: verbs whose prefix is taken as the org name.
//!
//! Lists load from config (per-field defaults via `default_seed`) and are
//! lowercased and trimmed on construction, so lookups are plain membership
//! tests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const VOCABULARY_VERSION: &str = "2024.10";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vocabulary {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_actors")]
    pub actors: BTreeSet<String>,
    #[serde(default = "default_suffixes")]
    pub suffixes: BTreeSet<String>,
    #[serde(default = "default_breach_keywords")]
    pub breach_keywords: Vec<String>,
    #[serde(default = "default_extract_keywords")]
    pub extract_keywords: Vec<String>,
    #[serde(default = "default_reporting_verbs")]
    pub reporting_verbs: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl Vocabulary {
    /// Built-in lists. Used when no config overrides them.
    pub fn default_seed() -> Self {
        Self {
            version: default_version(),
            actors: default_actors(),
            suffixes: default_suffixes(),
            breach_keywords: default_breach_keywords(),
            extract_keywords: default_extract_keywords(),
            reporting_verbs: default_reporting_verbs(),
        }
    }

    /// Lowercase, trim and drop empty entries in every list.
    pub fn sanitized(self) -> Self {
        Self {
            version: self.version.trim().to_string(),
            actors: clean_set(self.actors),
            suffixes: clean_set(self.suffixes),
            breach_keywords: clean_list(self.breach_keywords),
            extract_keywords: clean_list(self.extract_keywords),
            reporting_verbs: clean_list(self.reporting_verbs),
        }
    }

    /// ActorFilter: true if any whitespace token of `org_norm` is a known actor.
    pub fn is_actor(&self, org_norm: &str) -> bool {
        org_norm
            .split_whitespace()
            .any(|tok| self.actors.contains(tok))
    }

    pub fn is_suffix(&self, token: &str) -> bool {
        self.suffixes.contains(token)
    }

    /// KeywordClassifier: case-insensitive substring search over the breach terms.
    pub fn is_incident_title(&self, title: &str) -> bool {
        let t = title.to_lowercase();
        self.breach_keywords
            .iter()
            .any(|k| !k.is_empty() && t.contains(k.as_str()))
    }
}

fn clean_set(items: BTreeSet<String>) -> BTreeSet<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim().to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

fn owned_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_version() -> String {
    VOCABULARY_VERSION.to_string()
}

fn default_actors() -> BTreeSet<String> {
    owned_set(&[
        "lockbit",
        "lockbit3",
        "alphv",
        "blackcat",
        "clop",
        "cl0p",
        "conti",
        "revil",
        "sodinokibi",
        "blackbasta",
        "akira",
        "rhysida",
        "bianlian",
        "blacksuit",
        "ransomhub",
        "qilin",
        "8base",
        "noescape",
        "ragnarlocker",
        "vicesociety",
        "lapsus",
        "killnet",
        "shinyhunters",
        "scatteredspider",
        "nobelium",
        "lazarus",
        "fin7",
        "apt28",
        "apt29",
        "apt41",
        "darkside",
        "blackmatter",
        "maze",
        "ryuk",
        "babuk",
        "everest",
        "hunters",
        "incransom",
    ])
}

fn default_suffixes() -> BTreeSet<String> {
    owned_set(&[
        "inc",
        "incorporated",
        "ltd",
        "limited",
        "llc",
        "llp",
        "plc",
        "corp",
        "corporation",
        "co",
        "company",
        "group",
        "holdings",
        "holding",
        "gmbh",
        "ag",
        "sa",
        "nv",
        "bv",
        "pty",
        "lp",
    ])
}

fn default_breach_keywords() -> Vec<String> {
    owned_list(&[
        "data breach",
        "breach",
        "leak",
        "ransomware",
        "stolen data",
        "exposed data",
        "compromise",
        "attack",
        "hacked",
    ])
}

fn default_extract_keywords() -> Vec<String> {
    owned_list(&["data breach", "cyber attack", "breach", "hacked"])
}

fn default_reporting_verbs() -> Vec<String> {
    owned_list(&[
        "confirms",
        "discloses",
        "reports",
        "says",
        "suffers",
        "notifies",
        "warns",
        "admits",
        "investigates",
        "hit by",
        "targeted by",
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v() -> Vocabulary {
        Vocabulary::default_seed()
    }

    #[test]
    fn actor_match_is_token_exact() {
        let v = v();
        assert!(v.is_actor("lockbit claims responsibility for hospital"));
        assert!(v.is_actor("clop"));
        // no partial matches
        assert!(!v.is_actor("lockbitsupply"));
        assert!(!v.is_actor("blocklock"));
        assert!(!v.is_actor(""));
    }

    #[test]
    fn classifier_is_case_insensitive_substring() {
        let v = v();
        assert!(v.is_incident_title("ACME suffers RANSOMWARE attack"));
        assert!(v.is_incident_title("Records leaked from portal"));
        assert!(v.is_incident_title("Vendor compromised via phishing"));
        assert!(!v.is_incident_title("Patch Tuesday roundup for October"));
    }

    #[test]
    fn classifier_is_deterministic() {
        let v = v();
        let t = "Hospital network breach disclosed";
        let first = v.is_incident_title(t);
        for _ in 0..5 {
            assert_eq!(v.is_incident_title(t), first);
        }
    }

    #[test]
    fn sanitized_lowercases_and_drops_blanks() {
        let raw = Vocabulary {
            version: " test ".into(),
            actors: owned_set(&[" LockBit ", ""]),
            suffixes: owned_set(&["INC"]),
            breach_keywords: owned_list(&["Breach", "breach ", " "]),
            extract_keywords: owned_list(&["Hacked"]),
            reporting_verbs: owned_list(&["Says"]),
        };
        let s = raw.sanitized();
        assert_eq!(s.version, "test");
        assert!(s.actors.contains("lockbit"));
        assert_eq!(s.actors.len(), 1);
        assert!(s.is_suffix("inc"));
        assert_eq!(s.breach_keywords, vec!["breach".to_string()]);
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_lists() {
        let parsed: Vocabulary = toml::from_str(r#"actors = ["examplegang"]"#).unwrap();
        assert!(parsed.is_actor("examplegang"));
        assert!(!parsed.is_actor("lockbit"));
        assert_eq!(parsed.suffixes, default_suffixes());
        assert_eq!(parsed.version, VOCABULARY_VERSION);
    }
}
