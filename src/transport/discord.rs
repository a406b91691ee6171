use std::sync::Arc;

use async_trait::async_trait;
use serenity::{
    builder::{CreateMessage, EditMessage},
    http::Http,
    model::{
        channel::MessageFlags,
        id::{ChannelId, MessageId as DiscordMessageId},
    },
};
use tracing::debug;

use super::{Markup, MessageId, Messenger, PinnedMessage, TransportError};

/// A Discord text channel reached through the bot's HTTP client.
///
/// Discord keeps every pin; the most recently pinned message is the settings message.
pub struct Discord {
    http: Arc<Http>,
    channel: ChannelId,
}

impl Discord {
    pub fn new(token: &str, channel_id: u64) -> Self {
        Self::with_http(Arc::new(Http::new(token)), channel_id)
    }

    pub fn with_http(http: Arc<Http>, channel_id: u64) -> Self {
        Self {
            http,
            channel: ChannelId::new(channel_id),
        }
    }
}

impl From<serenity::Error> for TransportError {
    fn from(error: serenity::Error) -> Self {
        TransportError::Discord(Box::new(error))
    }
}

#[async_trait]
impl Messenger for Discord {
    fn markup(&self) -> Markup {
        Markup::Markdown
    }

    async fn send(
        &self,
        text: &str,
        _markup: Option<Markup>,
        preview: bool,
    ) -> Result<MessageId, TransportError> {
        let mut builder = CreateMessage::new().content(text);
        if !preview {
            builder = builder.flags(MessageFlags::SUPPRESS_EMBEDS);
        }

        let message = self.channel.send_message(self.http.as_ref(), builder).await?;
        Ok(MessageId(message.id.get()))
    }

    async fn edit(&self, id: MessageId, text: &str) -> Result<(), TransportError> {
        self.channel
            .edit_message(
                self.http.as_ref(),
                DiscordMessageId::new(id.0),
                EditMessage::new().content(text),
            )
            .await?;
        Ok(())
    }

    async fn pin(&self, id: MessageId, silent: bool) -> Result<(), TransportError> {
        if silent {
            debug!("Discord pins always post a system notice; ignoring silent flag");
        }
        self.channel
            .pin(self.http.as_ref(), DiscordMessageId::new(id.0))
            .await?;
        Ok(())
    }

    async fn pinned(&self) -> Result<Option<PinnedMessage>, TransportError> {
        let pins = self.channel.pins(self.http.as_ref()).await?;

        Ok(pins.into_iter().next().map(|message| PinnedMessage {
            id: MessageId(message.id.get()),
            text: message.content,
        }))
    }
}
