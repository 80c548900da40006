use std::fmt;

use serde::{Deserialize, Serialize};

/// A wallet address used as a chat identity.
///
/// Wallet addresses are case-insensitive: `0xAbC` and `0xabc` name the same
/// user. The canonical form (trimmed, lowercase) is the only form ever stored,
/// so equality, ordering and hashing all follow it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletId(String);

impl WalletId {
    /// Canonicalize a raw address. Returns `None` for empty or blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for WalletId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        WalletId::parse(&value).ok_or_else(|| "wallet address must not be empty".to_string())
    }
}

impl From<WalletId> for String {
    fn from(wallet: WalletId) -> Self {
        wallet.0
    }
}
