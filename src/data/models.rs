use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Feed name to feed URL, in the order the document lists them.
pub type Feeds = IndexMap<String, String>;

/// The document kept in the channel's pinned message.
///
/// Equality is structural: feed order and JSON formatting do not matter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub feeds: Feeds,
    #[serde(default = "epoch", with = "timestamp")]
    pub last_scan: DateTime<Utc>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feeds: Feeds::new(),
            last_scan: epoch(),
        }
    }
}

impl Settings {
    pub fn new(feeds: Feeds) -> Self {
        Self {
            feeds,
            ..Self::default()
        }
    }

    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn render(&self) -> String {
        // Serializing a string map and a string cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Returns a copy with the scan threshold moved to `at`, truncated to whole seconds.
    pub fn scanned_at(&self, at: DateTime<Utc>) -> Self {
        Self {
            feeds: self.feeds.clone(),
            last_scan: at.trunc_subsecs(0),
        }
    }
}

pub fn epoch() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, false)
}

mod timestamp {
    use chrono::{DateTime, SubsecRound, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc).trunc_subsecs(0))
            .map_err(|e| de::Error::custom(format!("invalid last_scan {raw:?}: {e}")))
    }
}
