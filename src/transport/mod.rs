pub mod discord;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod telegram;

use async_trait::async_trait;
use thiserror::Error;

pub use discord::Discord;
#[cfg(any(test, feature = "test-util"))]
pub use memory::Memory;
pub use telegram::Telegram;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub u64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedMessage {
    pub id: MessageId,
    pub text: String,
}

/// The rich-text dialect a destination understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    Html,
    Markdown,
}

impl Markup {
    pub fn bold(self, text: &str) -> String {
        match self {
            Markup::Html => format!("<b>{}</b>", escape_html(text)),
            Markup::Markdown => format!("**{}**", escape_markdown(text)),
        }
    }

    pub fn link(self, text: &str, href: &str) -> String {
        match self {
            Markup::Html => format!(
                "<a href=\"{}\">{}</a>",
                escape_html(href).replace('"', "&quot;"),
                escape_html(text)
            ),
            Markup::Markdown => format!("[{}]({})", escape_markdown(text), href.replace(')', "%29")),
        }
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '*' | '_' | '~' | '`' | '|' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error {code}: {description}")]
    Telegram { code: i64, description: String },

    #[error("Discord API error: {0}")]
    Discord(#[from] Box<serenity::Error>),

    #[error("message {0} not found")]
    UnknownMessage(MessageId),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// The operations the bot needs from a chat destination.
///
/// Every call goes to the single configured channel.
#[async_trait]
pub trait Messenger: Send + Sync {
    fn markup(&self) -> Markup;

    async fn send(&self, text: &str, markup: Option<Markup>, preview: bool)
    -> Result<MessageId, TransportError>;

    async fn edit(&self, id: MessageId, text: &str) -> Result<(), TransportError>;

    async fn pin(&self, id: MessageId, silent: bool) -> Result<(), TransportError>;

    async fn pinned(&self) -> Result<Option<PinnedMessage>, TransportError>;
}
