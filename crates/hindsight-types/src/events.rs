use serde::{Deserialize, Serialize};

use crate::content::{ChatRef, MessageContent};

/// Events delivered by the transport bridge over the webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InboundEvent {
    /// The owner (dis)connected the delegated channel. `enabled: false`
    /// means the delegation was revoked.
    ConnectionEstablished {
        owner_id: i64,
        raw_connection_id: String,
        enabled: bool,
        locale: String,
    },

    /// A message arrived in one of the delegated chats.
    MessageReceived {
        raw_connection_id: String,
        message_id: i64,
        author_id: i64,
        chat: ChatRef,
        content: MessageContent,
    },

    /// A previously delivered message was edited at the source.
    MessageEdited {
        raw_connection_id: String,
        message_id: i64,
        editor_id: i64,
        chat: ChatRef,
        new_content: MessageContent,
    },

    /// One or more messages were deleted at the source, all from the same
    /// chat and connection.
    MessagesDeleted {
        raw_connection_id: String,
        message_ids: Vec<i64>,
        chat: ChatRef,
    },
}
