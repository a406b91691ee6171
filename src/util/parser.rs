use chrono::{DateTime, Utc};
use feed_rs::{model, parser};

/// One entry of a parsed feed, reduced to what notifications need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

impl From<model::Entry> for RawEntry {
    fn from(entry: model::Entry) -> Self {
        Self {
            title: entry.title.map(|t| t.content),
            link: entry.links.into_iter().next().map(|l| l.href),
            summary: entry.summary.map(|s| s.content.trim().to_string()),
            published: entry.published,
            updated: entry.updated,
        }
    }
}

pub fn parse(content: &[u8]) -> Result<Vec<RawEntry>, parser::ParseFeedError> {
    let feed = parser::parse(content)?;
    Ok(feed.entries.into_iter().map(RawEntry::from).collect())
}
