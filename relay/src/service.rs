use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use tourney_common::conversation::ConversationId;
use tourney_common::message::{Message, MessageKind};
use tourney_common::wallet::WalletId;

use crate::error::ChatError;
use crate::roster::RosterGateway;
use crate::store::ConversationStore;
use crate::unread::UnreadIndex;

/// A wallet the user can message, with how many of its messages the user has
/// not read yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailablePeer {
    pub wallet_address: WalletId,
    pub display_name: Option<String>,
    pub handles: serde_json::Value,
    pub unread_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    pub conversation_id: ConversationId,
    pub messages: Vec<Message>,
    pub participants: [WalletId; 2],
}

/// The four chat operations. Holds no state beyond its collaborators.
pub struct ChatService<R> {
    store: Arc<ConversationStore>,
    roster: R,
}

impl<R: RosterGateway> ChatService<R> {
    pub fn new(store: Arc<ConversationStore>, roster: R) -> Self {
        Self { store, roster }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Wallets sharing a non-finished tournament with `wallet`, each with the
    /// number of unread messages it sent to `wallet`.
    pub async fn list_available_peers(&self, wallet: &str) -> Result<Vec<AvailablePeer>, ChatError> {
        let wallet = require_wallet(wallet, "wallet")?;
        let peers = self.roster.co_participants(&wallet).await?;

        let available = self
            .store
            .read(|record| {
                let index = UnreadIndex::over(record);
                peers
                    .into_iter()
                    .map(|p| {
                        let id = ConversationId::for_pair(&wallet, &p.wallet_address);
                        AvailablePeer {
                            unread_count: index.count_for_pair(&id, &wallet),
                            wallet_address: p.wallet_address,
                            display_name: p.display_name,
                            handles: p.handles,
                        }
                    })
                    .collect::<Vec<_>>()
            })
            .await;

        debug!("{} has {} available peers", wallet, available.len());
        Ok(available)
    }

    /// The thread between `viewer` and `other`. Opening it marks the viewer's
    /// incoming messages as read; a thread that does not exist yet comes back
    /// empty and nothing is written.
    pub async fn get_conversation(&self, viewer: &str, other: &str) -> Result<ConversationView, ChatError> {
        let viewer = require_wallet(viewer, "viewer")?;
        let other = require_wallet(other, "other")?;
        let id = ConversationId::for_pair(&viewer, &other);

        let view = match self.store.open_for(&id, &viewer).await? {
            Some(conversation) => ConversationView {
                conversation_id: conversation.id,
                messages: conversation.messages,
                participants: conversation.participants,
            },
            None => ConversationView {
                conversation_id: id,
                messages: Vec::new(),
                participants: [viewer, other],
            },
        };
        Ok(view)
    }

    pub async fn send_message(
        &self,
        from: &str,
        to: &str,
        body: &str,
        kind: MessageKind,
    ) -> Result<Message, ChatError> {
        self.store.append(from, to, body, kind).await
    }

    pub async fn get_unread_count(&self, wallet: &str) -> Result<usize, ChatError> {
        let wallet = require_wallet(wallet, "wallet")?;
        Ok(self
            .store
            .read(|record| UnreadIndex::over(record).count_for(&wallet))
            .await)
    }
}

fn require_wallet(raw: &str, field: &str) -> Result<WalletId, ChatError> {
    WalletId::parse(raw)
        .ok_or_else(|| ChatError::validation(format!("{} must not be empty or blank", field)))
}
