use breach_digest::digest::assemble::is_placeholder_source;
use breach_digest::ingest::providers::feed_xml::parse_feed;
use breach_digest::{DigestEngine, Limits, RawEntry, SourceBatch, SourceKind, Vocabulary};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 20, 0, 0, 0).unwrap()
}

fn day(d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, d, h, 0, 0).unwrap()
}

fn entry(title: &str, at: DateTime<Utc>) -> RawEntry {
    RawEntry::titled(title).with_published(at)
}

fn fixture_batches() -> Vec<SourceBatch> {
    let load = |name: &str, kind, xml: &str| {
        SourceBatch::new(name, kind, parse_feed(xml).expect("fixture parses").entries)
    };
    vec![
        load("DataBreaches.net", SourceKind::Incident, include_str!("fixtures/incident_rss.xml")),
        load("The Hacker News", SourceKind::General, include_str!("fixtures/news_atom.xml")),
        load("Krebs on Security", SourceKind::General, include_str!("fixtures/news_rss.xml")),
    ]
}

#[test]
fn fixture_run_end_to_end() {
    let digest = DigestEngine::default().build(&fixture_batches(), now());

    assert_eq!(digest.generated_at, "2024-10-20T00:00:00Z");
    assert!(!digest.summary.is_empty());

    let orgs: Vec<_> = digest.breaches.iter().map(|b| b.org.as_str()).collect();
    assert_eq!(
        orgs,
        vec!["Initech", "Hooli", "Umbrella Health", "Globex Holdings", "Acme Corp."]
    );
    // undated entry falls back to the run instant
    assert_eq!(digest.breaches[0].ts, "2024-10-20T00:00:00Z");
    assert_eq!(digest.breaches[0].published, "2024-10-20T00:00:00Z");

    let titles: Vec<_> = digest.rss.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Patch Tuesday: Microsoft fixes 117 flaws",
            "New OSINT techniques for geolocation",
            "Weekly security roundup",
        ]
    );
    // cross-source duplicate attributed to the source processed first
    assert_eq!(digest.rss[0].source, "The Hacker News");
}

#[test]
fn latest_record_wins_per_organization() {
    let batches = vec![SourceBatch::new(
        "Breaches",
        SourceKind::Incident,
        vec![
            entry("Acme: breach disclosed", day(1, 10)),
            entry("Acme Corp. confirms 2M records exposed", day(3, 9)),
        ],
    )];
    let digest = DigestEngine::default().build(&batches, now());

    assert_eq!(digest.breaches.len(), 1);
    assert_eq!(digest.breaches[0].ts, "2024-10-03T09:00:00Z");
    assert_eq!(digest.breaches[0].title, "Acme Corp. confirms 2M records exposed");
}

#[test]
fn one_record_per_org_with_max_ts() {
    let titles_and_days = [
        ("Acme Corp: ransomware attack", 2),
        ("ACME CORPORATION | data leak", 7),
        ("acme - stolen data for sale", 5),
        ("Globex: breach", 4),
        ("Globex Ltd. hacked again", 9),
    ];
    let entries = titles_and_days
        .iter()
        .map(|(t, d)| entry(t, day(*d, 0)))
        .collect();
    let batches = vec![SourceBatch::new("B", SourceKind::Incident, entries)];
    let engine = DigestEngine::default();
    let digest = engine.build(&batches, now());

    assert_eq!(digest.breaches.len(), 2);
    let keys: HashSet<_> = digest
        .breaches
        .iter()
        .map(|b| engine.normalize_org(&b.org))
        .collect();
    assert_eq!(keys.len(), 2);
    assert_eq!(digest.breaches[0].ts, "2024-10-09T00:00:00Z");
    assert_eq!(digest.breaches[1].ts, "2024-10-07T00:00:00Z");
}

#[test]
fn actor_mentions_never_reach_breaches() {
    let batches = vec![SourceBatch::new(
        "B",
        SourceKind::Incident,
        vec![
            entry("LockBit claims responsibility for hospital breach", day(2, 0)),
            entry("Clop | MOVEit data leak victims named", day(3, 0)),
            entry("Hooli: ransomware attack", day(1, 0)),
        ],
    )];
    let engine = DigestEngine::default();
    let (digest, stats) = engine.build_with_stats(&batches, now());

    assert_eq!(stats.rejected_actor, 2);
    assert_eq!(digest.breaches.len(), 1);
    assert_eq!(digest.breaches[0].org, "Hooli");
    for b in &digest.breaches {
        assert!(!engine.vocabulary().is_actor(&engine.normalize_org(&b.org)));
    }
}

#[test]
fn keyword_matches_are_exclusive_to_breaches() {
    let batches = vec![SourceBatch::new(
        "News",
        SourceKind::General,
        vec![
            entry("Initech suffers ransomware attack", day(3, 0)),
            entry("LockBit leak site goes dark", day(4, 0)),
            entry("Conference season recap", day(5, 0)),
        ],
    )];
    let engine = DigestEngine::default();
    let digest = engine.build(&batches, now());

    let rss_titles: HashSet<_> = digest.rss.iter().map(|r| r.title.clone()).collect();
    for b in &digest.breaches {
        assert!(!rss_titles.contains(&b.title));
    }
    for r in &digest.rss {
        assert!(!engine.vocabulary().is_incident_title(&r.title));
    }
    assert_eq!(digest.rss.len(), 1);
    assert_eq!(digest.breaches.len(), 1);
    assert_eq!(digest.breaches[0].org, "Initech");
}

#[test]
fn incident_feeds_do_not_feed_rss() {
    let batches = vec![SourceBatch::new(
        "Breaches",
        SourceKind::Incident,
        vec![entry("Weekly roundup of notices", day(1, 0))],
    )];
    let digest = DigestEngine::default().build(&batches, now());
    assert!(digest.rss.iter().all(|r| is_placeholder_source(&r.source)));
    assert_eq!(digest.breaches.len(), 1);
}

#[test]
fn caps_are_enforced_per_source_and_in_total() {
    let limits = Limits {
        per_feed: 3,
        total_cap: 5,
    };
    let engine = DigestEngine::new(Vocabulary::default_seed(), limits);

    let mut batches = Vec::new();
    for src in ["A", "B", "C"] {
        let general = (0..10)
            .map(|i| entry(&format!("{src} story {i}"), day(1 + i, 0)))
            .collect();
        batches.push(SourceBatch::new(format!("{src}-news"), SourceKind::General, general));
        let incidents = (0..10)
            .map(|i| entry(&format!("Org{src}{i}: data breach"), day(1 + i, 0)))
            .collect();
        batches.push(SourceBatch::new(format!("{src}-breaches"), SourceKind::Incident, incidents));
    }
    let digest = engine.build(&batches, now());

    assert_eq!(digest.rss.len(), 5);
    assert_eq!(digest.breaches.len(), 5);
    for src in ["A", "B", "C"] {
        let n_rss = digest.rss.iter().filter(|r| r.source == format!("{src}-news")).count();
        let n_br = digest
            .breaches
            .iter()
            .filter(|b| b.source == format!("{src}-breaches"))
            .count();
        assert!(n_rss <= 3);
        assert!(n_br <= 3);
    }
    // per-source cap keeps the first three feed entries (days 1..=3)
    assert!(digest.rss.iter().all(|r| r.ts.as_str() <= "2024-10-03T00:00:00Z"));
}

#[test]
fn empty_input_yields_placeholders() {
    let engine = DigestEngine::default();
    for batches in [
        Vec::new(),
        vec![SourceBatch::empty("Down", SourceKind::Incident)],
        vec![SourceBatch::new("Junk", SourceKind::General, vec![RawEntry::default()])],
    ] {
        let digest = engine.build(&batches, now());
        assert!(!digest.breaches.is_empty());
        assert!(digest.breaches.iter().all(|b| is_placeholder_source(&b.source)));
        assert!(digest.breaches.iter().any(|b| b.org == "ExampleCo"));
        assert!(!digest.rss.is_empty());
        assert!(digest.rss.iter().all(|r| is_placeholder_source(&r.source)));
    }
}

#[test]
fn output_json_has_only_contract_fields() {
    let digest = DigestEngine::default().build(&fixture_batches(), now());
    let v = serde_json::to_value(&digest).unwrap();

    let mut top: Vec<_> = v.as_object().unwrap().keys().cloned().collect();
    top.sort();
    assert_eq!(top, vec!["breaches", "generated_at", "rss", "summary"]);

    let mut b_keys: Vec<_> = v["breaches"][0].as_object().unwrap().keys().cloned().collect();
    b_keys.sort();
    assert_eq!(b_keys, vec!["link", "org", "published", "source", "title", "ts"]);

    let mut r_keys: Vec<_> = v["rss"][0].as_object().unwrap().keys().cloned().collect();
    r_keys.sort();
    assert_eq!(r_keys, vec!["link", "published", "source", "title", "ts"]);
}

#[test]
fn custom_vocabulary_changes_behaviour_without_code_changes() {
    let vocab = Vocabulary {
        actors: ["hooli".to_string()].into_iter().collect(),
        ..Vocabulary::default_seed()
    };
    let engine = DigestEngine::new(vocab, Limits::default());
    let batches = vec![SourceBatch::new(
        "B",
        SourceKind::Incident,
        vec![
            entry("Hooli: ransomware attack", day(1, 0)),
            entry("LockBit: new leak", day(2, 0)),
        ],
    )];
    let digest = engine.build(&batches, now());
    assert_eq!(digest.breaches.len(), 1);
    assert_eq!(digest.breaches[0].org, "LockBit");
}

#[test]
fn run_stats_count_both_dedups() {
    let batches = vec![
        SourceBatch::new(
            "Incidents",
            SourceKind::Incident,
            vec![
                entry("Acme: breach disclosed", day(1, 0)),
                entry("Acme Corp. confirms 2M records exposed", day(3, 0)),
                entry("Globex: ransomware attack", day(2, 0)),
            ],
        ),
        SourceBatch::new(
            "News A",
            SourceKind::General,
            vec![entry("Patch Tuesday roundup", day(4, 0))],
        ),
        SourceBatch::new(
            "News B",
            SourceKind::General,
            vec![
                entry("Patch Tuesday roundup", day(5, 0)),
                entry("Weekly OSINT notes", day(5, 0)),
            ],
        ),
    ];
    let (digest, stats) = DigestEngine::default().build_with_stats(&batches, now());

    assert_eq!(stats.org_dupes, 1);
    assert_eq!(stats.title_dupes, 1);
    assert_eq!(digest.breaches.len(), 2);
    assert_eq!(digest.rss.len(), 2);
    assert_eq!(digest.rss.iter().filter(|r| r.title == "Patch Tuesday roundup").count(), 1);
}
