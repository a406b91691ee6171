use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use tracing::debug;

use super::{Markup, MessageId, Messenger, PinnedMessage, TransportError};

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Telegram Bot API destination: a chat, group or channel the bot can post and pin in.
pub struct Telegram {
    client: Client,
    api_url: String,
    chat_id: String,
}

#[derive(Deserialize)]
struct Response<T> {
    ok: bool,
    result: Option<T>,
    error_code: Option<i64>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct Message {
    message_id: u64,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct Chat {
    #[serde(default)]
    pinned_message: Option<Message>,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    link_preview_options: LinkPreviewOptions,
}

#[derive(Serialize)]
struct LinkPreviewOptions {
    is_disabled: bool,
}

impl Telegram {
    pub fn new(client: Client, api_url: &str, token: &str, chat_id: &str) -> Self {
        Self {
            client,
            api_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            chat_id: chat_id.to_string(),
        }
    }

    async fn request<P: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: &str,
        params: &P,
    ) -> Result<T, TransportError> {
        debug!("Calling Telegram method {}", method);

        let response: Response<T> = self
            .client
            .post(format!("{}/{}", self.api_url, method))
            .json(params)
            .send()
            .await?
            .json()
            .await?;

        match response {
            Response {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            Response { ok: true, .. } => Err(TransportError::Unexpected(format!(
                "{method} returned no result"
            ))),
            Response {
                error_code,
                description,
                ..
            } => Err(TransportError::Telegram {
                code: error_code.unwrap_or_default(),
                description: description.unwrap_or_else(|| format!("{method} failed")),
            }),
        }
    }
}

fn parse_mode(markup: Markup) -> &'static str {
    match markup {
        Markup::Html => "HTML",
        Markup::Markdown => "MarkdownV2",
    }
}

#[async_trait]
impl Messenger for Telegram {
    fn markup(&self) -> Markup {
        Markup::Html
    }

    async fn send(
        &self,
        text: &str,
        markup: Option<Markup>,
        preview: bool,
    ) -> Result<MessageId, TransportError> {
        let params = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: markup.map(parse_mode),
            link_preview_options: LinkPreviewOptions {
                is_disabled: !preview,
            },
        };

        let message: Message = self.request("sendMessage", &params).await?;
        Ok(MessageId(message.message_id))
    }

    async fn edit(&self, id: MessageId, text: &str) -> Result<(), TransportError> {
        let params = json!({
            "chat_id": self.chat_id,
            "message_id": id.0,
            "text": text,
        });

        // Edits of messages sent by the bot return the edited message.
        let _: Message = self.request("editMessageText", &params).await?;
        Ok(())
    }

    async fn pin(&self, id: MessageId, silent: bool) -> Result<(), TransportError> {
        let params = json!({
            "chat_id": self.chat_id,
            "message_id": id.0,
            "disable_notification": silent,
        });

        let _: bool = self.request("pinChatMessage", &params).await?;
        Ok(())
    }

    async fn pinned(&self) -> Result<Option<PinnedMessage>, TransportError> {
        let chat: Chat = self
            .request("getChat", &json!({ "chat_id": self.chat_id }))
            .await?;

        Ok(chat.pinned_message.map(|message| PinnedMessage {
            id: MessageId(message.message_id),
            text: message.text.unwrap_or_default(),
        }))
    }
}
