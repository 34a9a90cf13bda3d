//! Chat Wire Protocol
//!
//! Frame shapes exchanged with the forum service's WebSocket endpoint.
//! Control frames out of the client are string-tagged JSON objects; posted
//! messages keep the service's older numeric tag. Inbound payloads are not
//! tagged at all: an array is a history snapshot, a lone object is one live
//! message.

use serde::{Deserialize, Serialize};

/// Numeric wire tag for a posted chat message. The service predates the
/// string-tagged control frames and still expects this variant on posts.
pub const MSG_TYPE_CHAT: u8 = 1;

/// One chat message record as the service emits it.
///
/// `id` is assigned server-side and may be absent on a message that was just
/// posted and echoed back before persistence. The client never mints ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub sender: String,
    #[serde(default)]
    pub user_id: i64,
    pub content: String,
    /// Epoch milliseconds.
    #[serde(default)]
    pub timestamp: i64,
}

/// Control frames sent FROM the client after the connection is established.
///
/// Ordering matters: `Auth` must precede `GetHistory` on a fresh connection
/// because the server may gate history on identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Identify this connection: `{"type":"auth","token":...}`.
    Auth { token: String },
    /// Request the last `limit` messages: `{"type":"get_history","limit":N}`.
    GetHistory { limit: u32 },
}

/// A posted chat message: `{"type":1,"content",...}`.
///
/// Kept separate from [`ClientFrame`] because its tag is numeric and the
/// string-tagged enum cannot carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPost {
    #[serde(rename = "type")]
    pub msg_type: u8,
    pub content: String,
    pub sender: String,
    pub user_id: i64,
    /// Epoch milliseconds at send time.
    pub timestamp: i64,
}

impl ChatPost {
    pub fn new(content: impl Into<String>, sender: impl Into<String>, user_id: i64) -> Self {
        Self {
            msg_type: MSG_TYPE_CHAT,
            content: content.into(),
            sender: sender.into(),
            user_id,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Everything the server sends downstream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ServerFrame {
    /// Bulk history snapshot; replaces the transcript wholesale.
    History(Vec<ChatMessage>),
    /// One live message to append.
    Message(ChatMessage),
}
