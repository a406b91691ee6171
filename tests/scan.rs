//! End-to-end scans against an in-memory channel and scripted feeds.
//!
//! Each test seeds the pinned settings document, runs one full scan and
//! inspects what was sent and what ended up pinned.

use std::{collections::HashMap, sync::Mutex, time::Duration};

use async_trait::async_trait;
use chrono::{SubsecRound, TimeZone, Utc};
use pretty_assertions::assert_eq;
use rsspin::{
    Error,
    data::{SaveOutcome, models::Settings},
    scheduler::tasks::check,
    transport::{Markup, Memory, memory::Call},
    util::{
        fetcher::{FeedSource, FetchError},
        pacer::Pacer,
        parser::RawEntry,
    },
};
use tokio_test::assert_ok;

struct Scripted {
    feeds: HashMap<String, Vec<RawEntry>>,
    fetched: Mutex<Vec<String>>,
}

impl Scripted {
    fn new(feeds: &[(&str, Vec<RawEntry>)]) -> Self {
        Self {
            feeds: feeds
                .iter()
                .map(|(url, entries)| (url.to_string(), entries.clone()))
                .collect(),
            fetched: Mutex::new(Vec::new()),
        }
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedSource for Scripted {
    async fn fetch(&self, url: &str) -> Result<Vec<RawEntry>, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());
        match self.feeds.get(url) {
            Some(entries) => Ok(entries.clone()),
            None => Err(FetchError::Parse(
                feed_rs::parser::parse("<html></html>".as_bytes()).unwrap_err(),
            )),
        }
    }
}

fn entry(title: &str, published: &str) -> RawEntry {
    RawEntry {
        title: Some(title.to_string()),
        link: Some(format!("https://example.com/{title}")),
        published: Some(published.parse().unwrap()),
        ..RawEntry::default()
    }
}

fn pacer() -> Pacer {
    Pacer::new(Duration::ZERO)
}

#[tokio::test]
async fn new_entry_is_sent_and_threshold_moves_to_wall_clock() {
    let memory = Memory::new(Markup::Html).with_pinned(
        r#"{"feeds": {"A": "https://a.example/feed"}, "last_scan": "2024-01-01T00:00:00Z"}"#,
    );
    let source = Scripted::new(&[(
        "https://a.example/feed",
        vec![entry("launch", "2024-01-02T00:00:00Z")],
    )]);

    let before = Utc::now().trunc_subsecs(0);
    let report = assert_ok!(check(&memory, &source, &mut pacer()).await);
    let after = Utc::now();

    assert_eq!(
        memory.sent(),
        vec!["<b>launch</b>\n<a href=\"https://example.com/launch\">Read more</a>".to_string()]
    );
    assert_eq!(report.saved, SaveOutcome::Written);

    let stored = Settings::parse(&memory.pinned_message().unwrap().text).unwrap();
    assert_eq!(stored.feeds, report.settings.feeds);
    assert_eq!(stored.feeds.get("A").map(String::as_str), Some("https://a.example/feed"));
    assert!(stored.last_scan >= before && stored.last_scan <= after);
    assert_ne!(stored.last_scan, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
}

#[tokio::test]
async fn entry_at_threshold_is_not_resent() {
    let memory = Memory::default().with_pinned(
        r#"{"feeds": {"A": "https://a.example/feed"}, "last_scan": "2024-01-01T00:00:00Z"}"#,
    );
    let source = Scripted::new(&[(
        "https://a.example/feed",
        vec![entry("same", "2024-01-01T00:00:00Z")],
    )]);

    let report = check(&memory, &source, &mut pacer()).await.unwrap();

    assert!(memory.sent().is_empty());
    assert_eq!(report.feeds[0].skipped, 1);
    let stored = Settings::parse(&memory.pinned_message().unwrap().text).unwrap();
    assert!(stored.last_scan > Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
}

#[tokio::test]
async fn failing_feed_does_not_stop_the_others() {
    let memory = Memory::default().with_pinned(
        r#"{
  "feeds": {
    "A": "https://a.example/feed",
    "Broken": "https://broken.example/feed",
    "C": "https://c.example/feed"
  },
  "last_scan": "2024-01-01T00:00:00Z"
}"#,
    );
    let source = Scripted::new(&[
        ("https://a.example/feed", vec![entry("a1", "2024-01-05T00:00:00Z")]),
        ("https://c.example/feed", vec![entry("c1", "2024-01-06T00:00:00Z")]),
    ]);

    let report = assert_ok!(check(&memory, &source, &mut pacer()).await);

    assert_eq!(
        source.fetched(),
        vec![
            "https://a.example/feed",
            "https://broken.example/feed",
            "https://c.example/feed"
        ]
    );
    assert_eq!(memory.sent().len(), 2);
    assert_eq!(report.failed(), 1);
    assert!(matches!(report.feeds[1].error, Some(Error::FeedFetch { .. })));
    assert_eq!(report.saved, SaveOutcome::Written);
}

#[tokio::test]
async fn missing_pin_aborts_before_anything_is_sent() {
    let memory = Memory::default();
    let source = Scripted::new(&[]);

    let err = check(&memory, &source, &mut pacer()).await.unwrap_err();

    assert!(matches!(err, Error::MissingState));
    assert_eq!(memory.calls(), vec![Call::Pinned]);
    assert!(source.fetched().is_empty());
}

#[tokio::test]
async fn corrupt_pin_aborts_the_scan() {
    let memory = Memory::default().with_pinned("feeds: A");
    let source = Scripted::new(&[]);

    let err = check(&memory, &source, &mut pacer()).await.unwrap_err();

    assert!(matches!(err, Error::CorruptState(_)));
    assert_eq!(memory.writes(), 0);
}

#[tokio::test]
async fn undated_entries_are_ignored() {
    let memory = Memory::default().with_pinned(
        r#"{"feeds": {"A": "https://a.example/feed"}, "last_scan": "2024-01-01T00:00:00Z"}"#,
    );
    let undated = RawEntry {
        title: Some("undated".to_string()),
        ..RawEntry::default()
    };
    let source = Scripted::new(&[("https://a.example/feed", vec![undated])]);

    let report = check(&memory, &source, &mut pacer()).await.unwrap();

    assert!(memory.sent().is_empty());
    assert_eq!(report.feeds[0].sent, 0);
    assert_eq!(report.feeds[0].skipped, 0);
}

#[tokio::test]
async fn settings_message_keeps_its_identity() {
    let memory = Memory::default().with_pinned(
        r#"{"feeds": {"A": "https://a.example/feed"}, "last_scan": "2024-01-01T00:00:00Z"}"#,
    );
    let source = Scripted::new(&[("https://a.example/feed", vec![])]);
    let original = memory.pinned_message().unwrap().id;

    check(&memory, &source, &mut pacer()).await.unwrap();

    let calls = memory.calls();
    assert!(calls.contains(&Call::Edit(original)));
    assert!(calls.contains(&Call::Pin {
        id: original,
        silent: true
    }));
    assert_eq!(memory.pinned_message().unwrap().id, original);
}
