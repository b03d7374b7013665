// src/ingest/providers/feed_xml.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

use crate::ingest::config::SourceConfig;
use crate::ingest::types::{RawEntry, SourceBatch, SourceKind, SourceProvider};

pub const USER_AGENT: &str = "BreachDigest/1.0";
pub const FETCH_TIMEOUT_SECS: u64 = 20;
const ACCEPT: &str = "application/rss+xml, application/atom+xml, */*";

// --- RSS 2.0 ---
//
// quick-xml matches elements by local name, so `<media:title>` lands in
// `title` and `<atom:link>` in `link`. Those fields are lists; the first
// non-blank value is the unprefixed one in practice.

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "title", default)]
    titles: Vec<TextNode>,
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    #[serde(rename = "title", default)]
    titles: Vec<TextNode>,
    #[serde(rename = "link", default)]
    links: Vec<TextNode>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    /// `<dc:date>`, W3C-DTF (RFC 3339 profile).
    #[serde(rename = "date")]
    dc_date: Option<String>,
}

// --- Atom ---

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "title", default)]
    titles: Vec<TextNode>,
    #[serde(rename = "entry", default)]
    entry: Vec<AtomEntry>,
}
#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(rename = "title", default)]
    titles: Vec<TextNode>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
}
#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}
/// Element whose text we want regardless of attributes (`<title type="html">`).
#[derive(Debug, Deserialize)]
struct TextNode {
    #[serde(rename = "$text", default)]
    value: String,
}

fn first_text(nodes: Vec<TextNode>) -> Option<String> {
    nodes.into_iter().map(|n| n.value).find(|v| !v.trim().is_empty())
}

fn to_chrono(dt: OffsetDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.unix_timestamp(), 0)
}

pub fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()
        .and_then(to_chrono)
}

pub fn parse_rfc3339(ts: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(ts.trim(), &Rfc3339)
        .ok()
        .and_then(to_chrono)
}

/// Parsed feed: its own title plus entries in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<RawEntry>,
}

/// Parse an RSS 2.0 or Atom document. RSS is tried first.
pub fn parse_feed(xml: &str) -> Result<ParsedFeed> {
    let t0 = std::time::Instant::now();
    let xml_clean = scrub_html_entities_for_xml(xml);

    let parsed = match from_str::<Rss>(&xml_clean) {
        Ok(rss) => from_rss(rss),
        // Every Atom field is optional, so only try it on an actual <feed> root.
        Err(rss_err) if !xml_clean.contains("<feed") => {
            return Err(anyhow!("not an RSS or Atom document: {rss_err}"));
        }
        Err(_) => from_str::<AtomFeed>(&xml_clean)
            .map(from_atom)
            .context("parsing atom xml")?,
    };

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("digest_parse_ms").record(ms);
    Ok(parsed)
}

fn from_rss(rss: Rss) -> ParsedFeed {
    let entries = rss
        .channel
        .item
        .into_iter()
        .map(|it| {
            let published_parsed = it.pub_date.as_deref().and_then(parse_rfc2822);
            let updated_parsed = it.dc_date.as_deref().and_then(parse_rfc3339);
            RawEntry {
                title: first_text(it.titles).unwrap_or_default(),
                link: first_text(it.links).unwrap_or_default().trim().to_string(),
                published: it.pub_date,
                updated: it.dc_date,
                published_parsed,
                updated_parsed,
            }
        })
        .collect();
    ParsedFeed {
        title: non_blank(first_text(rss.channel.titles)),
        entries,
    }
}

fn from_atom(feed: AtomFeed) -> ParsedFeed {
    let entries = feed
        .entry
        .into_iter()
        .map(|e| {
            let link = e
                .links
                .iter()
                .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
                .or_else(|| e.links.first())
                .and_then(|l| l.href.clone())
                .unwrap_or_default();
            RawEntry {
                title: first_text(e.titles).unwrap_or_default(),
                link: link.trim().to_string(),
                published_parsed: e.published.as_deref().and_then(parse_rfc3339),
                updated_parsed: e.updated.as_deref().and_then(parse_rfc3339),
                published: e.published,
                updated: e.updated,
            }
        })
        .collect();
    ParsedFeed {
        title: non_blank(first_text(feed.titles)),
        entries,
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Provider for one configured RSS/Atom feed.
pub struct FeedProvider {
    name: String,
    configured_name: Option<String>,
    kind: SourceKind,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        url: String,
        client: reqwest::Client,
    },
}

impl FeedProvider {
    /// Serve a fixed document (tests, offline runs).
    pub fn from_fixture_str(name: &str, kind: SourceKind, xml: &str) -> Self {
        Self {
            name: name.to_string(),
            configured_name: Some(name.to_string()),
            kind,
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn from_config(cfg: &SourceConfig, client: reqwest::Client) -> Self {
        Self {
            name: cfg.name.clone().unwrap_or_else(|| cfg.url.clone()),
            configured_name: cfg.name.clone(),
            kind: cfg.kind,
            mode: Mode::Http {
                url: cfg.url.clone(),
                client,
            },
        }
    }

    /// Shared HTTP client for all feeds.
    pub fn http_client() -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .context("building http client")
    }

    fn batch_from(&self, parsed: ParsedFeed) -> SourceBatch {
        // configured name → feed title → URL
        let source_name = self
            .configured_name
            .clone()
            .or(parsed.title)
            .unwrap_or_else(|| self.name.clone());
        SourceBatch::new(source_name, self.kind, parsed.entries)
    }
}

#[async_trait]
impl SourceProvider for FeedProvider {
    async fn fetch_latest(&self) -> Result<SourceBatch> {
        match &self.mode {
            Mode::Fixture(s) => Ok(self.batch_from(parse_feed(s)?)),
            Mode::Http { url, client } => {
                let resp = client
                    .get(url.as_str())
                    .header(reqwest::header::ACCEPT, ACCEPT)
                    .send()
                    .await
                    .with_context(|| format!("GET {url}"))?
                    .error_for_status()
                    .with_context(|| format!("GET {url}"))?;
                let body = resp.text().await.context("feed http .text()")?;
                let parsed = parse_feed(&body).with_context(|| format!("feed {url}"))?;
                Ok(self.batch_from(parsed))
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }
}

/// Build one HTTP provider per configured source, in order.
pub fn providers_from_config(sources: &[SourceConfig]) -> Result<Vec<Box<dyn SourceProvider>>> {
    let client = FeedProvider::http_client()?;
    Ok(sources
        .iter()
        .map(|s| Box::new(FeedProvider::from_config(s, client.clone())) as Box<dyn SourceProvider>)
        .collect())
}

/// HTML entities that are not valid XML would abort the parser.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "\u{2013}")
        .replace("&mdash;", "\u{2014}")
        .replace("&ldquo;", "\u{201C}")
        .replace("&rdquo;", "\u{201D}")
        .replace("&lsquo;", "\u{2018}")
        .replace("&rsquo;", "\u{2019}")
        .replace("&hellip;", "\u{2026}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc2822_and_rfc3339_parse() {
        let a = parse_rfc2822("Tue, 15 Oct 2024 10:30:00 +0200").unwrap();
        assert_eq!(a.to_rfc3339(), "2024-10-15T08:30:00+00:00");
        let b = parse_rfc3339("2024-10-15T08:30:00Z").unwrap();
        assert_eq!(a, b);
        assert!(parse_rfc2822("last tuesday").is_none());
        assert!(parse_rfc3339("").is_none());
    }

    #[test]
    fn scrub_keeps_dash_semantics() {
        let s = scrub_html_entities_for_xml("Acme&nbsp;&ndash;&nbsp;hacked");
        assert_eq!(s, "Acme \u{2013} hacked");
    }

    #[test]
    fn dc_date_fills_updated() {
        let xml = r#"<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/"><channel>
            <title>T</title>
            <item><title>Acme: breach</title><dc:date>2024-10-14T13:00:00Z</dc:date></item>
        </channel></rss>"#;
        let feed = parse_feed(xml).unwrap();
        let e = &feed.entries[0];
        assert!(e.published.is_none());
        assert_eq!(e.updated.as_deref(), Some("2024-10-14T13:00:00Z"));
        assert_eq!(e.updated_parsed, parse_rfc3339("2024-10-14T13:00:00Z"));
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_feed("this is not xml").is_err());
    }
}
