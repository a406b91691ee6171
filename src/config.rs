use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;

use crate::transport::telegram::DEFAULT_API_URL;

pub const DEFAULT_PATH: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("missing {0}: set it in the config file or the environment")]
    Missing(&'static str),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Telegram,
    Discord,
}

impl Transport {
    fn token_var(self) -> &'static str {
        match self {
            Transport::Telegram => "TELEGRAM_API_KEY",
            Transport::Discord => "DISCORD_TOKEN",
        }
    }

    fn channel_var(self) -> &'static str {
        match self {
            Transport::Telegram => "TELEGRAM_CHANNEL_ID",
            Transport::Discord => "DISCORD_CHANNEL_ID",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct File {
    bot: Bot,
    scan: Scan,
    http: Http,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Bot {
    transport: Option<Transport>,
    token: Option<String>,
    channel: Option<String>,
    api_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Scan {
    check_interval_minutes: u64,
    requests_per_second: f64,
}

impl Default for Scan {
    fn default() -> Self {
        Self {
            check_interval_minutes: 15,
            requests_per_second: 1.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Http {
    timeout_secs: u64,
    user_agent: String,
}

impl Default for Http {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 RSS Bot".to_string(),
        }
    }
}

pub struct Config {
    pub transport: Transport,
    pub token: String,
    pub channel: String,
    pub api_url: String,
    pub check_interval_minutes: u64,
    pub requests_per_second: f64,
    pub spacing: Duration,
    pub timeout: Duration,
    pub user_agent: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("transport", &self.transport)
            .field("token", &"<redacted>")
            .field("channel", &self.channel)
            .field("api_url", &self.api_url)
            .field("check_interval_minutes", &self.check_interval_minutes)
            .field("requests_per_second", &self.requests_per_second)
            .field("spacing", &self.spacing)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Config {
    /// Reads the config file and overlays the process environment.
    ///
    /// Without an explicit `path`, a missing `config.toml` is fine and the
    /// environment alone must supply the token and channel.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = path.is_some();
        let path = path.unwrap_or(Path::new(DEFAULT_PATH));
        let content = read_optional(path, explicit)?;

        Self::resolve(content.as_deref(), &path.to_string_lossy(), |key| {
            std::env::var(key).ok()
        })
    }

    pub fn from_toml(content: &str, env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Self::resolve(Some(content), "<inline>", env)
    }

    fn resolve(
        content: Option<&str>,
        origin: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file: File = match content {
            Some(content) => toml::from_str(content).map_err(|source| ConfigError::Parse {
                path: PathBuf::from(origin),
                source,
            })?,
            None => File::default(),
        };

        let transport = match env("RSSPIN_TRANSPORT") {
            Some(value) => parse_transport(&value)?,
            None => file.bot.transport.unwrap_or_default(),
        };

        let token = env(transport.token_var())
            .or(file.bot.token)
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing(transport.token_var()))?;
        let channel = env(transport.channel_var())
            .or(file.bot.channel)
            .filter(|channel| !channel.trim().is_empty())
            .ok_or(ConfigError::Missing(transport.channel_var()))?;

        if transport == Transport::Discord {
            parse_discord_channel(&channel)?;
        }

        let spacing = spacing(file.scan.requests_per_second)?;
        if file.scan.check_interval_minutes == 0 || file.scan.check_interval_minutes > 59 {
            return Err(ConfigError::Invalid {
                field: "scan.check_interval_minutes",
                reason: format!("must be between 1 and 59, got {}", file.scan.check_interval_minutes),
            });
        }

        Ok(Self {
            transport,
            token,
            channel,
            api_url: file.bot.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            check_interval_minutes: file.scan.check_interval_minutes,
            requests_per_second: file.scan.requests_per_second,
            spacing,
            timeout: Duration::from_secs(file.http.timeout_secs),
            user_agent: file.http.user_agent,
        })
    }

    pub fn discord_channel(&self) -> Result<u64, ConfigError> {
        parse_discord_channel(&self.channel)
    }
}

fn spacing(rate: f64) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        field: "scan.requests_per_second",
        reason,
    };

    if !(rate.is_finite() && rate > 0.0) {
        return Err(invalid(format!("must be positive, got {rate}")));
    }
    Duration::try_from_secs_f64(1.0 / rate)
        .map_err(|_| invalid(format!("{rate} per second is too slow to schedule")))
}

/// Reads `path`; a missing file is only an error when the user named it.
fn read_optional(path: &Path, explicit: bool) -> Result<Option<String>, ConfigError> {
    if !explicit && !path.exists() {
        return Ok(None);
    }
    read(path).map(Some)
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_transport(value: &str) -> Result<Transport, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "telegram" => Ok(Transport::Telegram),
        "discord" => Ok(Transport::Discord),
        other => Err(ConfigError::Invalid {
            field: "RSSPIN_TRANSPORT",
            reason: format!("unknown transport {other:?}"),
        }),
    }
}

fn parse_discord_channel(channel: &str) -> Result<u64, ConfigError> {
    channel
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .ok_or_else(|| ConfigError::Invalid {
            field: "DISCORD_CHANNEL_ID",
            reason: format!("expected a numeric channel id, got {channel:?}"),
        })
}
