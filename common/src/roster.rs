//! Tournament roster document served by the games service (`GET /games`) and
//! the co-participant lookup the relay builds its peer list from.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::wallet::WalletId;

/// Status value marking a tournament as over.
pub const FINISHED_STATUS: &str = "finished";

/// The whole `/games` response: game id -> game, kept in the order the games
/// service sent them.
///
/// Only the top level has to be an object. Games, tournaments and
/// participants are read one entry at a time, so an entry of the wrong shape
/// is skipped without hiding the rest of the roster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GamesDocument(Map<String, Value>);

impl GamesDocument {
    /// Every well-formed tournament of every game, in document order.
    pub fn tournaments(&self) -> impl Iterator<Item = Tournament> + '_ {
        self.0
            .values()
            .filter_map(|game| game.get("tournaments")?.as_object())
            .flat_map(|tournaments| tournaments.values())
            .filter_map(|tournament| Tournament::deserialize(tournament).ok())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// An array of participant entries, or an object keyed by some
    /// registration id. Both are read in document order.
    #[serde(default)]
    pub participants: Value,
}

impl Tournament {
    pub fn is_finished(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case(FINISHED_STATUS))
    }

    /// The usable participant entries. Entries without a wallet string are
    /// dropped.
    pub fn participants(&self) -> Vec<Participant> {
        let entries: Box<dyn Iterator<Item = &Value> + '_> = match &self.participants {
            Value::Array(list) => Box::new(list.iter()),
            Value::Object(keyed) => Box::new(keyed.values()),
            _ => Box::new(std::iter::empty()),
        };
        entries.filter_map(Participant::from_entry).collect()
    }
}

/// A wallet sharing at least one live tournament with the requesting wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub wallet_address: WalletId,
    pub display_name: Option<String>,
    pub handles: Value,
}

impl Participant {
    /// Read one `{ walletAddress, displayName?, handles? }` entry. A
    /// `displayName` that is not a string reads as absent, and `handles` that
    /// are not an object read as `{}`.
    fn from_entry(entry: &Value) -> Option<Self> {
        let wallet_address = WalletId::parse(entry.get("walletAddress")?.as_str()?)?;
        let display_name = entry
            .get("displayName")
            .and_then(Value::as_str)
            .map(str::to_string);
        let handles = match entry.get("handles") {
            Some(Value::Object(handles)) => Value::Object(handles.clone()),
            _ => Value::Object(Map::new()),
        };
        Some(Self {
            wallet_address,
            display_name,
            handles,
        })
    }
}

/// Every other wallet found in a non-finished tournament that `wallet` is
/// also registered in. De-duplicated by wallet; the first record seen wins.
pub fn co_participants(games: &GamesDocument, wallet: &WalletId) -> Vec<Participant> {
    let mut seen = BTreeSet::new();
    let mut peers = Vec::new();

    for tournament in games.tournaments() {
        if tournament.is_finished() {
            continue;
        }
        let members = tournament.participants();
        if !members.iter().any(|p| &p.wallet_address == wallet) {
            continue;
        }
        for member in members {
            if &member.wallet_address == wallet {
                continue;
            }
            if seen.insert(member.wallet_address.clone()) {
                peers.push(member);
            }
        }
    }

    peers
}
