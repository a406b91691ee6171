use anyhow::{Result, anyhow};
use tracing::warn;
use url::Url;

use crate::{
    data::{SettingsStore, models::Feeds},
    transport::{MessageId, Messenger},
};

/// Posts and pins the first settings document.
pub async fn execute(messenger: &dyn Messenger, feeds: &[String]) -> Result<MessageId> {
    let feeds = parse_feeds(feeds)?;
    if feeds.is_empty() {
        warn!("No feeds given; the pinned settings will start empty");
    }

    if messenger.pinned().await?.is_some() {
        warn!("Channel already has a pinned message; the new settings message replaces it");
    }

    let id = SettingsStore::new(messenger).initialize(feeds).await?;
    Ok(id)
}

fn parse_feeds(specs: &[String]) -> Result<Feeds> {
    let mut feeds = Feeds::new();

    for spec in specs {
        let (name, url) = spec
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected NAME=URL, got {:?}", spec))?;
        let name = name.trim();
        let url = url.trim();

        if name.is_empty() {
            return Err(anyhow!("Feed name missing in {:?}", spec));
        }
        if !validate_url(url) {
            return Err(anyhow!("Invalid feed URL for {}: {}", name, url));
        }
        if feeds.insert(name.to_string(), url.to_string()).is_some() {
            return Err(anyhow!("Duplicate feed name: {}", name));
        }
    }

    Ok(feeds)
}

fn validate_url(url: &str) -> bool {
    Url::parse(url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{data::models::Settings, transport::Memory};

    fn specs(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn parses_name_url_pairs_in_order() {
        let feeds = parse_feeds(&specs(&[
            "220Triathlon=https://www.220triathlon.com/feed/atom",
            " Blog = https://blog.example/rss?x=1 ",
        ]))
        .unwrap();

        assert_eq!(
            feeds.into_iter().collect::<Vec<_>>(),
            vec![
                (
                    "220Triathlon".to_string(),
                    "https://www.220triathlon.com/feed/atom".to_string()
                ),
                ("Blog".to_string(), "https://blog.example/rss?x=1".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_bad_specs() {
        assert!(parse_feeds(&specs(&["no-separator"])).is_err());
        assert!(parse_feeds(&specs(&["=https://a.example"])).is_err());
        assert!(parse_feeds(&specs(&["A=ftp://a.example"])).is_err());
        assert!(parse_feeds(&specs(&["A=https://a.example", "A=https://b.example"])).is_err());
    }

    #[tokio::test]
    async fn pins_initial_settings() {
        let memory = Memory::default();
        let id = execute(&memory, &specs(&["A=https://a.example/feed"]))
            .await
            .unwrap();

        let pinned = memory.pinned_message().unwrap();
        assert_eq!(pinned.id, id);
        assert_eq!(
            Settings::parse(&pinned.text).unwrap().feeds.get("A").map(String::as_str),
            Some("https://a.example/feed")
        );
    }
}
