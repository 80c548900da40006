use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::wallet::WalletId;

/// Maximum number of messages retained per conversation. Older messages are
/// dropped as new ones arrive.
pub const MAX_MESSAGES: usize = 3;

/// Joins the two sorted wallet addresses of a conversation key.
pub const CONVERSATION_ID_SEPARATOR: char = '_';

/// Key of the conversation between an unordered pair of wallets.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// `for_pair(a, b) == for_pair(b, a)`, whatever the casing of either side.
    pub fn for_pair(a: &WalletId, b: &WalletId) -> Self {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Self(format!("{}{}{}", lo, CONVERSATION_ID_SEPARATOR, hi))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bounded message thread between two wallets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    /// Fixed at creation: `[first sender, first recipient]`.
    pub participants: [WalletId; 2],
    /// Oldest first, never longer than [`MAX_MESSAGES`].
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub last_message_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(from: &WalletId, to: &WalletId, now: DateTime<Utc>) -> Self {
        Self {
            id: ConversationId::for_pair(from, to),
            participants: [from.clone(), to.clone()],
            messages: Vec::new(),
            created_at: now,
            last_message_at: now,
        }
    }

    /// Append a message, discarding the oldest ones beyond [`MAX_MESSAGES`].
    pub fn push(&mut self, message: Message) {
        self.last_message_at = message.sent_at;
        self.messages.push(message);
        if self.messages.len() > MAX_MESSAGES {
            let excess = self.messages.len() - MAX_MESSAGES;
            self.messages.drain(..excess);
        }
    }

    /// Mark every unread message addressed to `recipient` as read.
    /// Returns how many messages changed.
    pub fn mark_read_for(&mut self, recipient: &WalletId) -> usize {
        let mut changed = 0;
        for message in self
            .messages
            .iter_mut()
            .filter(|m| m.is_unread_for(recipient))
        {
            message.read = true;
            changed += 1;
        }
        changed
    }

    pub fn unread_for(&self, wallet: &WalletId) -> usize {
        self.messages
            .iter()
            .filter(|m| m.is_unread_for(wallet))
            .count()
    }

    pub fn has_participant(&self, wallet: &WalletId) -> bool {
        self.participants.contains(wallet)
    }

    pub fn contains_message(&self, id: &str) -> bool {
        self.messages.iter().any(|m| m.id == id)
    }
}
