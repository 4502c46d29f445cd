//! Telegram Bot API client
//!
//! Delivers the weekly wrap to a chat, optionally into a forum topic
//! (message thread) of a supergroup. The bot token is never logged.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::TelegramConfig;
use crate::error::{Error, Result};

/// Where a message goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatDestination {
    pub chat_id: i64,
    /// Topic inside a forum supergroup
    pub thread_id: Option<i64>,
}

/// A text message ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub destination: ChatDestination,
    pub text: String,
    /// Render the text as Markdown
    pub markdown: bool,
}

/// Delivers chat messages
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &ChatMessage) -> Result<()>;
}

/// Basic bot identity returned by `getMe`
#[derive(Debug, Clone, Deserialize)]
pub struct BotInfo {
    pub id: i64,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Clone)]
pub struct TelegramBot {
    http_client: Client,
    base_url: String,
    bot_token: String,
    destination: ChatDestination,
}

/// `sendMessage` request body
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_thread_id: Option<i64>,
    disable_web_page_preview: bool,
}

/// Envelope for every Bot API response
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

impl TelegramBot {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            http_client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            destination: ChatDestination {
                chat_id: config.chat_id,
                thread_id: config.topic_id.filter(|id| *id > 0),
            },
        }
    }

    /// The configured chat (and topic)
    pub fn destination(&self) -> ChatDestination {
        self.destination
    }

    /// Check the token by calling `getMe`
    pub async fn test_connection(&self) -> Result<BotInfo> {
        debug!("Testing Telegram bot connection");
        let response = self
            .http_client
            .get(self.method_url("getMe"))
            .send()
            .await?;

        let info: BotInfo = read_result(response).await?;
        info!(bot = ?info.username, "Telegram bot connection test successful");
        Ok(info)
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.bot_token, method)
    }
}

#[async_trait]
impl Notifier for TelegramBot {
    async fn send(&self, message: &ChatMessage) -> Result<()> {
        let request = SendMessageRequest {
            chat_id: message.destination.chat_id,
            text: &message.text,
            parse_mode: message.markdown.then_some("Markdown"),
            message_thread_id: message.destination.thread_id,
            disable_web_page_preview: true,
        };

        if let Some(thread_id) = request.message_thread_id {
            debug!(thread_id, "Sending message to topic");
        }

        let response = self
            .http_client
            .post(self.method_url("sendMessage"))
            .json(&request)
            .send()
            .await?;

        let _: serde_json::Value = read_result(response).await?;
        info!(chat_id = message.destination.chat_id, "Message delivered");
        Ok(())
    }
}

/// Unwrap a Bot API response, turning `ok: false` into an error
///
/// Telegram reports failures with a non-2xx status *and* a JSON body, so the
/// body is parsed before the status is considered.
async fn read_result<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    let parsed: ApiResponse<T> = serde_json::from_str(&body).map_err(|_| {
        Error::Telegram(format!("unexpected response ({}): {}", status, body))
    })?;

    if !parsed.ok {
        return Err(Error::Telegram(
            parsed
                .description
                .unwrap_or_else(|| format!("request failed with status {}", status)),
        ));
    }

    parsed
        .result
        .ok_or_else(|| Error::Telegram("response has no result".into()))
}
