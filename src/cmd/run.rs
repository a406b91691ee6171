use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::cmd::{Services, sync};

pub fn schedule(interval_minutes: u64) -> String {
    format!("0 */{} * * * *", interval_minutes)
}

/// Scans on a cron schedule until the process is stopped.
///
/// A tick that arrives while the previous scan is still running is skipped.
pub async fn execute(services: Services, interval_minutes: u64) -> Result<()> {
    let services = Arc::new(Mutex::new(services));

    // Scan once right away so a fresh start does not wait a full interval.
    tick(services.clone()).await;

    let scheduler = JobScheduler::new().await?;
    let services_for_job = services.clone();

    scheduler
        .add(Job::new_async(
            &schedule(interval_minutes),
            move |_uuid, _l| {
                let services = services_for_job.clone();
                Box::pin(async move {
                    tick(services).await;
                })
            },
        )?)
        .await?;

    scheduler.start().await?;
    info!("Scanning every {} minutes", interval_minutes);

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    Ok(())
}

async fn tick(services: Arc<Mutex<Services>>) {
    let Ok(mut services) = services.try_lock() else {
        warn!("Previous scan still running, skipping this tick");
        return;
    };

    if let Err(e) = sync::execute(&mut services).await {
        error!("Feed check error: {:#}", e);
    }
}
