//! Chat transport abstraction.
//!
//! The dispatcher consumes a stream of [`InboundEvent`](crate::models::InboundEvent)s
//! and replies through [`Transport::send`]. The Telegram Bot API is the only
//! production implementation.

pub mod telegram;

use async_trait::async_trait;

use crate::models::ChatProfile;

pub use telegram::TelegramTransport;

/// Outbound side of the chat transport
#[async_trait]
pub trait Transport: Send + Sync {
    /// Delivers one message to a chat
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), TransportError>;

    /// Best-effort lookup of a chat's type, handle and names
    async fn resolve_identity(&self, chat_id: i64) -> Result<ChatProfile, TransportError>;
}

/// Transport failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        // The Bot API URL embeds the token, so it must never reach the logs
        let e = e.without_url();
        if e.is_decode() {
            TransportError::Decode(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}
