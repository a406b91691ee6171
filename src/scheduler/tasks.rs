use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::{
    data::{
        SaveOutcome, SettingsStore,
        models::{Settings, format_timestamp},
    },
    error::{Error, Result},
    scheduler::{
        classifier::{Classification, classify},
        notifier::{Notifier, UNTITLED},
    },
    transport::Messenger,
    util::{fetcher::FeedSource, pacer::Pacer},
};

#[derive(Debug)]
pub struct FeedReport {
    pub name: String,
    pub sent: u32,
    pub skipped: u32,
    pub error: Option<Error>,
}

#[derive(Debug)]
pub struct ScanReport {
    pub feeds: Vec<FeedReport>,
    pub settings: Settings,
    pub saved: SaveOutcome,
}

impl ScanReport {
    pub fn sent(&self) -> u32 {
        self.feeds.iter().map(|feed| feed.sent).sum()
    }

    pub fn failed(&self) -> usize {
        self.feeds.iter().filter(|feed| feed.error.is_some()).count()
    }
}

/// Runs one full scan: load settings, forward new entries of every feed, persist the new threshold.
///
/// Feed failures are reported and skipped. Any other error aborts the scan
/// before the threshold is saved, so the next run sees the same entries again.
pub async fn check(
    messenger: &dyn Messenger,
    source: &dyn FeedSource,
    pacer: &mut Pacer,
) -> Result<ScanReport> {
    let store = SettingsStore::new(messenger);
    let settings = store.load().await?;

    info!("Last scanned: {}", format_timestamp(&settings.last_scan));
    info!("Loaded {} feeds from pinned message:", settings.feeds.len());
    for (name, url) in &settings.feeds {
        info!("- {}: {}", name, url);
    }

    let notifier = Notifier::new(messenger);
    let total = settings.feeds.len();
    let mut feeds = Vec::with_capacity(total);

    for (index, (name, url)) in settings.feeds.iter().enumerate() {
        info!("Checking feed {} / {}: {} ({})", index + 1, total, name, url);
        let report = process(name, url, settings.last_scan, source, &notifier, pacer).await?;
        feeds.push(report);
    }

    let settings = settings.scanned_at(Utc::now());
    let saved = store.save(&settings).await?;

    let report = ScanReport {
        feeds,
        settings,
        saved,
    };
    info!(
        "Feed check complete: {} sent, {} feeds failed",
        report.sent(),
        report.failed()
    );

    Ok(report)
}

async fn process(
    name: &str,
    url: &str,
    threshold: DateTime<Utc>,
    source: &dyn FeedSource,
    notifier: &Notifier<'_>,
    pacer: &mut Pacer,
) -> Result<FeedReport> {
    let mut report = FeedReport {
        name: name.to_string(),
        sent: 0,
        skipped: 0,
        error: None,
    };

    pacer.wait().await;
    let entries = match source.fetch(url).await {
        Ok(entries) => entries,
        Err(e) => {
            let error = Error::FeedFetch {
                url: url.to_string(),
                source: e,
            };
            warn!("Failed to parse feed {}: {}", name, error);
            report.error = Some(error);
            return Ok(report);
        }
    };

    info!("Feed {} has {} items", name, entries.len());

    for entry in &entries {
        match classify(entry, threshold) {
            Classification::New(_) => {
                pacer.wait().await;
                notifier.notify(entry).await?;
                report.sent += 1;
                info!("Sent: {}", entry.title.as_deref().unwrap_or(UNTITLED));
            }
            Classification::Stale => report.skipped += 1,
            Classification::Unclassifiable => {}
        }
    }

    info!("Feed {}: {} sent, {} skipped", name, report.sent, report.skipped);
    Ok(report)
}
