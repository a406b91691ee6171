use anyhow::{Context, Result};
use tracing::info;

use crate::{
    cmd::Services,
    data::SaveOutcome,
    scheduler::tasks::{ScanReport, check},
};

pub async fn execute(services: &mut Services) -> Result<ScanReport> {
    let report = check(
        services.messenger.as_ref(),
        &services.source,
        &mut services.pacer,
    )
    .await
    .context("Feed check failed")?;

    info!("{}", summary(&report));
    Ok(report)
}

pub fn summary(report: &ScanReport) -> String {
    let state = match report.saved {
        SaveOutcome::Written => "settings updated",
        SaveOutcome::Unchanged => "settings unchanged",
    };

    if report.sent() > 0 {
        format!(
            "Synced {} feeds and sent {} new items ({} failed, {})",
            report.feeds.len(),
            report.sent(),
            report.failed(),
            state
        )
    } else {
        format!(
            "Synced {} feeds, no new items found ({} failed, {})",
            report.feeds.len(),
            report.failed(),
            state
        )
    }
}
