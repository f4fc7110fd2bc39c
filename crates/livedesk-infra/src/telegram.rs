//! Minimal Telegram Bot API client for the operator channel.
//!
//! Two methods are enough for the relay: `sendMessage` for notifications
//! and acknowledgements, and long-polling `getUpdates` for inbound
//! operator commands. Responses use Telegram's `{ok, result, description}`
//! envelope.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use livedesk_core::relay::OperatorChannel;
use livedesk_types::error::ChannelError;

const API_BASE: &str = "https://api.telegram.org";

/// Extra headroom on top of the long-poll timeout before reqwest gives up.
const POLL_GRACE: Duration = Duration::from_secs(10);

/// Telegram's response envelope.
#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// One entry from `getUpdates`.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    pub chat: TelegramChat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

/// HTTP client for the Bot API, holding the bot credential.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    api_base: String,
    bot_token: String,
}

impl TelegramClient {
    pub fn new(bot_token: String) -> Self {
        Self {
            client: Client::new(),
            api_base: API_BASE.to_string(),
            bot_token,
        }
    }

    /// Override the API base, for tests against a local stub.
    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base;
        self
    }

    fn url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base.trim_end_matches('/'),
            self.bot_token,
            method
        )
    }

    /// Send a plain-text message to a chat.
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), ChannelError> {
        let response = self
            .client
            .post(self.url("sendMessage"))
            .timeout(Duration::from_secs(10))
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))?;

        let body: TelegramResponse<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))?;
        if body.ok {
            Ok(())
        } else {
            Err(ChannelError::Api(
                body.description
                    .unwrap_or_else(|| "sendMessage failed".to_string()),
            ))
        }
    }

    /// Long-poll for updates. `offset` is one past the last seen
    /// `update_id`; only message updates are requested.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        poll_timeout: Duration,
    ) -> Result<Vec<TelegramUpdate>, ChannelError> {
        let mut payload = json!({
            "timeout": poll_timeout.as_secs(),
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            payload["offset"] = json!(offset);
        }

        let response = self
            .client
            .post(self.url("getUpdates"))
            .timeout(poll_timeout + POLL_GRACE)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))?;

        let body: TelegramResponse<Vec<TelegramUpdate>> = response
            .json()
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))?;
        if body.ok {
            Ok(body.result.unwrap_or_default())
        } else {
            Err(ChannelError::Api(
                body.description
                    .unwrap_or_else(|| "getUpdates failed".to_string()),
            ))
        }
    }
}

/// Operator channel bound to the admin chat.
#[derive(Clone)]
pub struct TelegramChannel {
    client: TelegramClient,
    admin_chat_id: String,
}

impl TelegramChannel {
    pub fn new(client: TelegramClient, admin_chat_id: String) -> Self {
        Self {
            client,
            admin_chat_id,
        }
    }
}

impl OperatorChannel for TelegramChannel {
    async fn send_to_admin(&self, text: &str) -> Result<(), ChannelError> {
        self.client.send_message(&self.admin_chat_id, text).await
    }
}
