//! Tournament chat relay.
//!
//! Keeps short (three message) threads between pairs of wallets in a JSON file,
//! tracks read state, and lists which wallets a user currently shares a live
//! tournament with. Clients poll; there is no push channel.

pub mod api;
pub mod config;
pub mod error;
pub mod roster;
pub mod service;
pub mod store;
pub mod unread;

pub use api::router;
pub use error::{ChatError, PersistenceError};
pub use roster::{HttpRoster, RosterGateway};
pub use service::ChatService;
pub use store::ConversationStore;
