pub mod models;

use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    transport::{MessageId, Messenger},
};
use models::{Feeds, Settings, format_timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Unchanged,
    Written,
}

/// Reads and writes the settings document kept in the channel's pinned message.
pub struct SettingsStore<'a> {
    messenger: &'a dyn Messenger,
}

impl<'a> SettingsStore<'a> {
    pub fn new(messenger: &'a dyn Messenger) -> Self {
        Self { messenger }
    }

    /// Posts a fresh settings document and pins it without notifying members.
    ///
    /// Bootstrap only; the scan never calls this.
    pub async fn initialize(&self, feeds: Feeds) -> Result<MessageId> {
        let settings = Settings::new(feeds);
        let id = self.messenger.send(&settings.render(), None, false).await?;
        self.messenger.pin(id, true).await?;

        info!("Pinned settings message {} with {} feeds", id, settings.feeds.len());
        Ok(id)
    }

    pub async fn load(&self) -> Result<Settings> {
        let pinned = self.messenger.pinned().await?.ok_or(Error::MissingState)?;
        Settings::parse(&pinned.text).map_err(Error::CorruptState)
    }

    /// Writes `current` back unless the pinned document already holds the same settings.
    ///
    /// An unreadable pinned body counts as empty settings so a damaged
    /// document gets replaced instead of blocking the run.
    pub async fn save(&self, current: &Settings) -> Result<SaveOutcome> {
        let pinned = self.messenger.pinned().await?.ok_or(Error::MissingState)?;

        let previous = Settings::parse(&pinned.text).unwrap_or_else(|e| {
            warn!("Pinned settings unreadable, treating as empty: {}", e);
            Settings::default()
        });

        info!("Saving updated settings:");
        if previous.feeds == current.feeds {
            info!("  Feeds: unchanged");
        } else {
            info!(
                "  Feeds changed from {:?} to {:?}",
                previous.feeds, current.feeds
            );
        }
        info!(
            "  Last scan changed from {} to {}",
            format_timestamp(&previous.last_scan),
            format_timestamp(&current.last_scan)
        );

        if previous == *current {
            return Ok(SaveOutcome::Unchanged);
        }

        self.messenger.edit(pinned.id, &current.render()).await?;
        self.messenger.pin(pinned.id, true).await?;
        Ok(SaveOutcome::Written)
    }
}
