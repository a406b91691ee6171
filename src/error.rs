use thiserror::Error;

use crate::{config::ConfigError, transport::TransportError, util::fetcher::FetchError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("no pinned settings message found in the destination channel")]
    MissingState,

    #[error("pinned settings message is not a valid settings document: {0}")]
    CorruptState(#[source] serde_json::Error),

    #[error("failed to fetch feed {url}: {source}")]
    FeedFetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}
