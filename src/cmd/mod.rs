pub mod list;
pub mod run;
pub mod setup;
pub mod sync;

use crate::{
    config::{Config, Transport},
    error::Result,
    transport::{Discord, Messenger, Telegram, TransportError},
    util::{
        fetcher::{self, HttpFeedSource},
        pacer::Pacer,
    },
};

/// Everything a command needs to talk to the destination and the feeds.
pub struct Services {
    pub messenger: Box<dyn Messenger>,
    pub source: HttpFeedSource,
    pub pacer: Pacer,
}

impl Services {
    pub fn new(config: &Config) -> Result<Self> {
        let client =
            fetcher::client(config.timeout, &config.user_agent).map_err(TransportError::Http)?;

        let messenger: Box<dyn Messenger> = match config.transport {
            Transport::Telegram => Box::new(Telegram::new(
                client.clone(),
                &config.api_url,
                &config.token,
                &config.channel,
            )),
            Transport::Discord => Box::new(Discord::new(&config.token, config.discord_channel()?)),
        };

        Ok(Self {
            messenger,
            source: HttpFeedSource::new(client),
            pacer: Pacer::new(config.spacing),
        })
    }
}
