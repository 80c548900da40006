pub mod conversation;
pub mod message;
pub mod roster;
pub mod wallet;
