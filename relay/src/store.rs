//! File-backed conversation store.
//!
//! The whole store is one JSON document, rewritten after every mutation. All
//! mutations run under a single lock covering read-modify-persist, so two
//! concurrent requests can never overwrite each other's changes.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use tourney_common::conversation::{Conversation, ConversationId};
use tourney_common::message::{make_message_id, Message, MessageKind};
use tourney_common::wallet::WalletId;

use crate::error::{ChatError, PersistenceError};

pub const CONVERSATIONS_FILE: &str = "chat_conversations.json";
pub const USERS_FILE: &str = "chat_users.json";

/// Persisted layout of [`CONVERSATIONS_FILE`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationsRecord {
    #[serde(default)]
    pub conversations: BTreeMap<ConversationId, Conversation>,
}

impl ConversationsRecord {
    fn contains_message(&self, id: &str) -> bool {
        self.conversations.values().any(|c| c.contains_message(id))
    }
}

/// Persisted layout of [`USERS_FILE`]. Created on first run and otherwise
/// left alone; no chat operation reads or writes it yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsersRecord {
    #[serde(default)]
    pub users: BTreeMap<String, serde_json::Value>,
}

pub struct ConversationStore {
    conversations_path: PathBuf,
    state: Mutex<ConversationsRecord>,
}

impl ConversationStore {
    /// Load both chat records from `data_dir`, writing empty ones for any
    /// that do not exist yet. Safe to call on every start.
    ///
    /// A record that exists but cannot be parsed is an error; it is never
    /// replaced with an empty one.
    pub fn open_or_initialize(data_dir: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir).map_err(|source| PersistenceError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;

        let conversations_path = data_dir.join(CONVERSATIONS_FILE);
        let record: ConversationsRecord = load_or_init(&conversations_path)?;
        let users: UsersRecord = load_or_init(&data_dir.join(USERS_FILE))?;

        info!(
            "Chat store ready at {} ({} conversations, {} users)",
            data_dir.display(),
            record.conversations.len(),
            users.users.len()
        );

        Ok(Self {
            conversations_path,
            state: Mutex::new(record),
        })
    }

    pub async fn get(&self, id: &ConversationId) -> Option<Conversation> {
        self.state.lock().await.conversations.get(id).cloned()
    }

    /// Run `f` over the current store contents.
    pub async fn read<R>(&self, f: impl FnOnce(&ConversationsRecord) -> R) -> R {
        let state = self.state.lock().await;
        f(&state)
    }

    /// Append a message from `from` to `to`, creating the conversation if
    /// needed. The store is on disk before this returns.
    pub async fn append(
        &self,
        from: &str,
        to: &str,
        body: &str,
        kind: MessageKind,
    ) -> Result<Message, ChatError> {
        let from = WalletId::parse(from)
            .ok_or_else(|| ChatError::validation("from must not be empty or blank"))?;
        let to = WalletId::parse(to)
            .ok_or_else(|| ChatError::validation("to must not be empty or blank"))?;
        if body.trim().is_empty() {
            return Err(ChatError::validation("message must not be empty or blank"));
        }

        let mut state = self.state.lock().await;
        let now = Utc::now();
        let id = loop {
            let candidate = make_message_id(now, rand::random());
            if !state.contains_message(&candidate) {
                break candidate;
            }
        };
        let message = Message::new(id, from.clone(), to.clone(), body.to_string(), kind, now);

        let conversation_id = ConversationId::for_pair(&from, &to);
        let previous = state.conversations.get(&conversation_id).cloned();
        state
            .conversations
            .entry(conversation_id.clone())
            .or_insert_with(|| Conversation::new(&from, &to, now))
            .push(message.clone());

        if let Err(e) = self.persist(&state) {
            error!("Failed to persist message in {}: {}", conversation_id, e);
            restore(&mut state, conversation_id, previous);
            return Err(e.into());
        }

        info!("Stored message {} in {}", message.id, conversation_id);
        Ok(message)
    }

    /// Mark every unread message addressed to `recipient` in the conversation
    /// as read. Writes to disk only when something changed. Returns the number
    /// of messages marked.
    pub async fn mark_read_for(
        &self,
        id: &ConversationId,
        recipient: &WalletId,
    ) -> Result<usize, ChatError> {
        let mut state = self.state.lock().await;
        self.mark_read_locked(&mut state, id, recipient)
    }

    /// Mark the viewer's incoming messages read and return the conversation
    /// as it now stands, both under the same lock. `None` when the
    /// conversation does not exist; nothing is written in that case.
    pub async fn open_for(
        &self,
        id: &ConversationId,
        viewer: &WalletId,
    ) -> Result<Option<Conversation>, ChatError> {
        let mut state = self.state.lock().await;
        self.mark_read_locked(&mut state, id, viewer)?;
        Ok(state.conversations.get(id).cloned())
    }

    fn mark_read_locked(
        &self,
        state: &mut ConversationsRecord,
        id: &ConversationId,
        recipient: &WalletId,
    ) -> Result<usize, ChatError> {
        let Some(conversation) = state.conversations.get_mut(id) else {
            return Ok(0);
        };
        let previous = conversation.clone();
        let changed = conversation.mark_read_for(recipient);
        if changed == 0 {
            return Ok(0);
        }

        if let Err(e) = self.persist(state) {
            error!("Failed to persist read state for {}: {}", id, e);
            restore(state, id.clone(), Some(previous));
            return Err(e.into());
        }

        debug!("Marked {} messages read for {} in {}", changed, recipient, id);
        Ok(changed)
    }

    fn persist(&self, state: &ConversationsRecord) -> Result<(), PersistenceError> {
        write_json(&self.conversations_path, state)
    }
}

fn restore(state: &mut ConversationsRecord, id: ConversationId, previous: Option<Conversation>) {
    match previous {
        Some(conversation) => {
            state.conversations.insert(id, conversation);
        }
        None => {
            state.conversations.remove(&id);
        }
    }
}

// ─── Persistence ─────────────────────────────────────────────────────────────

fn load_or_init<T>(path: &Path) -> Result<T, PersistenceError>
where
    T: Default + Serialize + DeserializeOwned,
{
    match fs::read_to_string(path) {
        Ok(data) => serde_json::from_str(&data).map_err(|source| PersistenceError::Corrupt {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let empty = T::default();
            write_json(path, &empty)?;
            info!("Initialized {}", path.display());
            Ok(empty)
        }
        Err(source) => Err(PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write `value` next to `path` and rename it into place, so a crash mid-write
/// leaves the previous version intact.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    let data = serde_json::to_vec_pretty(value).map_err(PersistenceError::Encode)?;
    let tmp = path.with_extension("json.tmp");
    let io_err = |source: std::io::Error| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = fs::File::create(&tmp).map_err(io_err)?;
    file.write_all(&data).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    drop(file);
    fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}
