//! Telegram Bot API transport.
//!
//! Inbound messages come from `getUpdates` long polling; replies go out
//! through `sendMessage` with Markdown parse mode.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use serde_json::json;

use super::{Transport, TransportError};
use crate::config::TelegramConfig;
use crate::models::{ChatKind, ChatProfile, EventKind, InboundEvent, Sender};

/// Pause before polling again after a failed getUpdates call
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Extra HTTP timeout on top of the long-poll timeout
const POLL_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

// =============================================================================
// Bot API wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    from: Option<User>,
    text: Option<String>,
    #[serde(default)]
    entities: Vec<MessageEntity>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
    username: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct User {
    id: i64,
    username: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageEntity {
    #[serde(rename = "type")]
    kind: String,
    offset: usize,
}

impl Message {
    /// A message is a command when its first entity is a bot_command at offset 0
    fn is_command(&self) -> bool {
        self.entities
            .first()
            .is_some_and(|e| e.kind == "bot_command" && e.offset == 0)
    }

    /// Converts the message into an inbound event; messages without text are skipped
    fn into_event(self) -> Option<InboundEvent> {
        let is_command = self.is_command();
        let text = self.text?;

        let kind = if is_command {
            EventKind::Command {
                name: command_name(&text),
            }
        } else {
            EventKind::Text(text)
        };

        Some(InboundEvent {
            chat_id: self.chat.id,
            sender: self.from.map(|user| Sender {
                id: user.id,
                username: user.username,
                first_name: user.first_name,
                last_name: user.last_name,
            }),
            kind,
        })
    }
}

impl From<Chat> for ChatProfile {
    fn from(chat: Chat) -> Self {
        let kind = match chat.kind.as_str() {
            "private" => ChatKind::Private,
            "supergroup" => ChatKind::Supergroup,
            "channel" => ChatKind::Channel,
            _ => ChatKind::Group,
        };

        ChatProfile {
            id: chat.id,
            kind,
            username: chat.username,
            first_name: chat.first_name,
            last_name: chat.last_name,
        }
    }
}

/// `/stats@MotBot extra` -> `stats`
fn command_name(text: &str) -> String {
    let token = text.split_whitespace().next().unwrap_or_default();
    let token = token.strip_prefix('/').unwrap_or(token);
    token.split('@').next().unwrap_or_default().to_string()
}

// =============================================================================
// Transport
// =============================================================================

/// Telegram Bot API client
#[derive(Clone)]
pub struct TelegramTransport {
    client: reqwest::Client,
    /// `{api_url}/bot{token}`
    api_base: String,
    poll_timeout: Duration,
}

struct PollState {
    transport: TelegramTransport,
    offset: i64,
    pending: VecDeque<InboundEvent>,
}

impl TelegramTransport {
    pub fn new(config: &TelegramConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.poll_timeout + POLL_TIMEOUT_MARGIN)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_base: format!(
                "{}/bot{}",
                config.api_url.trim_end_matches('/'),
                config.bot_token
            ),
            poll_timeout: config.poll_timeout,
        }
    }

    /// Live, never-ending stream of inbound events.
    ///
    /// Polling failures are logged and retried after a short pause; they
    /// never end the stream.
    pub fn updates(&self) -> BoxStream<'static, InboundEvent> {
        let state = PollState {
            transport: self.clone(),
            offset: 0,
            pending: VecDeque::new(),
        };

        stream::unfold(state, |mut state| async move {
            loop {
                if let Some(event) = state.pending.pop_front() {
                    return Some((event, state));
                }

                match state.transport.get_updates(state.offset).await {
                    Ok(updates) => {
                        for update in updates {
                            state.offset = state.offset.max(update.update_id + 1);
                            if let Some(event) = update.message.and_then(Message::into_event) {
                                state.pending.push_back(event);
                            }
                        }
                    }
                    Err(e) => {
                        log::error!("Failed to fetch Telegram updates: {}", e);
                        tokio::time::sleep(POLL_RETRY_DELAY).await;
                    }
                }
            }
        })
        .boxed()
    }

    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TransportError> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": self.poll_timeout.as_secs(),
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    /// Calls a Bot API method. Error responses carry a JSON body with
    /// `ok: false`, so the body is decoded regardless of HTTP status.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, TransportError> {
        let response = self
            .client
            .post(format!("{}/{}", self.api_base, method))
            .json(body)
            .send()
            .await?;

        let api: ApiResponse<T> = response.json().await?;

        match (api.ok, api.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(TransportError::Api {
                code: api.error_code.unwrap_or_default(),
                description: api
                    .description
                    .unwrap_or_else(|| format!("{} failed", method)),
            }),
        }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        self.call::<IgnoredAny>(
            "sendMessage",
            &json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "Markdown",
            }),
        )
        .await?;
        Ok(())
    }

    async fn resolve_identity(&self, chat_id: i64) -> Result<ChatProfile, TransportError> {
        let chat: Chat = self.call("getChat", &json!({ "chat_id": chat_id })).await?;
        Ok(chat.into())
    }
}
