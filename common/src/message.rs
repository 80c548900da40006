use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::wallet::WalletId;

/// Unique identifier for a message: `"{unix_millis}-{random hex}"`.
pub type MessageId = String;

/// What a message carries. Only plain text exists today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum MessageKind {
    #[default]
    Text,
}

impl MessageKind {
    /// Parse the `messageType` field of a send request (case-insensitive).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Some(MessageKind::Text),
            _ => None,
        }
    }
}

/// A single direct message between two wallets.
///
/// Everything but `read` is fixed at creation. `read` only ever goes from
/// `false` to `true`, when the recipient opens the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub from: WalletId,
    pub to: WalletId,
    pub body: String,
    #[serde(default)]
    pub kind: MessageKind,
    pub sent_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

impl Message {
    pub fn new(
        id: MessageId,
        from: WalletId,
        to: WalletId,
        body: String,
        kind: MessageKind,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            from,
            to,
            body,
            kind,
            sent_at,
            read: false,
        }
    }

    pub fn is_unread_for(&self, wallet: &WalletId) -> bool {
        !self.read && &self.to == wallet
    }
}

/// Build a message id from a creation time and a random draw.
pub fn make_message_id(now: DateTime<Utc>, random: u64) -> MessageId {
    format!("{}-{:016x}", now.timestamp_millis(), random)
}
