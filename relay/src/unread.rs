//! Unread counters derived from a store snapshot.
//!
//! Counts are recomputed by a linear scan on every call. Threads hold at most
//! three messages, so this stays cheap; unbounded history would need a
//! per-participant counter maintained on write instead.

use tourney_common::conversation::ConversationId;
use tourney_common::wallet::WalletId;

use crate::store::ConversationsRecord;

pub struct UnreadIndex<'a> {
    record: &'a ConversationsRecord,
}

impl<'a> UnreadIndex<'a> {
    pub fn over(record: &'a ConversationsRecord) -> Self {
        Self { record }
    }

    /// Unread messages addressed to `wallet` across all its conversations.
    pub fn count_for(&self, wallet: &WalletId) -> usize {
        self.record
            .conversations
            .values()
            .filter(|c| c.has_participant(wallet))
            .map(|c| c.unread_for(wallet))
            .sum()
    }

    /// Unread messages addressed to `wallet` in one conversation.
    pub fn count_for_pair(&self, id: &ConversationId, wallet: &WalletId) -> usize {
        self.record
            .conversations
            .get(id)
            .map_or(0, |c| c.unread_for(wallet))
    }
}
