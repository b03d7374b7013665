// src/ingest/config.rs
use crate::digest::{Limits, Vocabulary};
use crate::ingest::types::SourceKind;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "DIGEST_CONFIG_PATH";
pub const DEFAULT_TOML_PATH: &str = "config/digest.toml";
pub const DEFAULT_JSON_PATH: &str = "config/digest.json";

/// One feed to pull from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceConfig {
    /// Display name; falls back to the feed's own title, then the URL.
    #[serde(default)]
    pub name: Option<String>,
    pub url: String,
    #[serde(default)]
    pub kind: SourceKind,
}

impl SourceConfig {
    pub fn new(name: &str, url: &str, kind: SourceKind) -> Self {
        Self {
            name: Some(name.to_string()),
            url: url.to_string(),
            kind,
        }
    }
}

/// Everything the digest needs: ordered sources, caps, word lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DigestConfig {
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub vocabulary: Vocabulary,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            limits: Limits::default(),
            vocabulary: Vocabulary::default_seed(),
        }
    }
}

impl DigestConfig {
    /// Trim names/URLs, drop URL-less and duplicate-URL sources (first wins),
    /// sanitize caps and word lists.
    pub fn sanitized(self) -> Self {
        let mut seen = HashSet::new();
        let mut sources = Vec::with_capacity(self.sources.len());
        for mut s in self.sources {
            s.url = s.url.trim().to_string();
            s.name = s
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty());
            if s.url.is_empty() || !seen.insert(s.url.clone()) {
                continue;
            }
            sources.push(s);
        }
        Self {
            sources,
            limits: self.limits.sanitized(),
            vocabulary: self.vocabulary.sanitized(),
        }
    }
}

/// Load config from an explicit path. Supports TOML or JSON formats.
pub fn load_config_from(path: &Path) -> Result<DigestConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading digest config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let cfg = parse_config(&content, ext.as_str())
        .with_context(|| format!("parsing digest config {}", path.display()))?;
    Ok(cfg.sanitized())
}

/// Load config using env var + fallbacks:
/// 1) $DIGEST_CONFIG_PATH
/// 2) config/digest.toml
/// 3) config/digest.json
/// 4) built-in defaults
pub fn load_config_default() -> Result<DigestConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_config_from(&pb);
        } else {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from(DEFAULT_TOML_PATH);
    if toml_p.exists() {
        return load_config_from(&toml_p);
    }
    let json_p = PathBuf::from(DEFAULT_JSON_PATH);
    if json_p.exists() {
        return load_config_from(&json_p);
    }
    tracing::info!("no digest config found, using built-in sources");
    Ok(DigestConfig::default().sanitized())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<DigestConfig> {
    match hint_ext {
        "toml" => return toml::from_str(s).context("invalid TOML"),
        "json" => return serde_json::from_str(s).context("invalid JSON"),
        _ => {}
    }
    // No usable extension: sniff.
    if s.trim_start().starts_with('{') {
        if let Ok(v) = serde_json::from_str(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = toml::from_str(s) {
        return Ok(v);
    }
    Err(anyhow!("unsupported digest config format"))
}

fn default_sources() -> Vec<SourceConfig> {
    use SourceKind::{General, Incident};
    vec![
        // Dedicated breach reporting
        SourceConfig::new("DataBreaches.net", "https://databreaches.net/feed/", Incident),
        // Government advisories
        SourceConfig::new(
            "CISA Advisories",
            "https://www.cisa.gov/news-events/cybersecurity-advisories.xml",
            General,
        ),
        SourceConfig::new("CISA Alerts", "https://www.cisa.gov/news-events/alerts.xml", General),
        SourceConfig::new(
            "NCSC UK",
            "https://www.ncsc.gov.uk/api/1/services/v1/all-rss-feed",
            General,
        ),
        // News & analysis
        SourceConfig::new("Krebs on Security", "https://krebsonsecurity.com/feed/", General),
        SourceConfig::new("BleepingComputer", "https://www.bleepingcomputer.com/feed/", General),
        SourceConfig::new(
            "The Hacker News",
            "https://thehackernews.com/feeds/posts/default",
            General,
        ),
        // OSINT publications
        SourceConfig::new("Bellingcat", "https://www.bellingcat.com/feed/", General),
        SourceConfig::new("OSINTCurious", "https://osintcurio.us/feed/", General),
        SourceConfig::new("Sector035", "https://sector035.nl/feed", General),
    ]
}
