use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use super::parser::{self, RawEntry};

const MAX_FEED_SIZE: usize = 5_000_000;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("feed too large: {0} bytes")]
    TooLarge(usize),
    #[error("malformed feed: {0}")]
    Parse(#[from] feed_rs::parser::ParseFeedError),
}

/// Turns a feed URL into its entries, in document order.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<RawEntry>, FetchError>;
}

pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

pub fn client(timeout: Duration, user_agent: &str) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> Result<Vec<RawEntry>, FetchError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status()));
        }

        let bytes = response.bytes().await?;
        if bytes.len() > MAX_FEED_SIZE {
            return Err(FetchError::TooLarge(bytes.len()));
        }

        Ok(parser::parse(&bytes)?)
    }
}
