use std::sync::Arc;

use crate::config::UsageAttribution;
use crate::models::{ChatProfile, Sender, UsageIdentity};
use crate::transport::Transport;

/// Label used when no name can be resolved
pub const UNKNOWN_LABEL: &str = "unknown";

/// Works out which user id and label a lookup is logged under
pub struct UsageAttributor {
    transport: Arc<dyn Transport>,
    group_policy: UsageAttribution,
}

impl UsageAttributor {
    pub fn new(transport: Arc<dyn Transport>, group_policy: UsageAttribution) -> Self {
        Self {
            transport,
            group_policy,
        }
    }

    /// Resolves the chat through the transport; falls back to the chat id
    /// with an `unknown` label when resolution fails
    pub async fn identify(&self, chat_id: i64, sender: Option<&Sender>) -> UsageIdentity {
        match self.transport.resolve_identity(chat_id).await {
            Ok(profile) => attribute(&profile, sender, self.group_policy),
            Err(e) => {
                log::warn!("Failed to resolve identity for chat {}: {}", chat_id, e);
                UsageIdentity {
                    user_id: chat_id,
                    label: UNKNOWN_LABEL.to_string(),
                }
            }
        }
    }
}

/// Attribution rules for a resolved chat
pub fn attribute(
    profile: &ChatProfile,
    sender: Option<&Sender>,
    group_policy: UsageAttribution,
) -> UsageIdentity {
    if profile.kind.is_private() {
        // In private chats the chat id is the user id
        return UsageIdentity {
            user_id: profile.id,
            label: profile
                .display_label()
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
        };
    }

    match (group_policy, sender) {
        (UsageAttribution::Sender, Some(sender)) => UsageIdentity {
            user_id: sender.id,
            label: sender
                .display_label()
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
        },
        _ => UsageIdentity {
            user_id: profile.id,
            label: group_label(profile.id),
        },
    }
}

/// Synthetic per-chat label for group lookups
pub fn group_label(chat_id: i64) -> String {
    format!("group_chat_{}", chat_id)
}
