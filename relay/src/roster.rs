//! Lookup of wallets sharing a live tournament, backed by the games service.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use tourney_common::roster::{co_participants, GamesDocument, Participant};
use tourney_common::wallet::WalletId;

use crate::error::ChatError;

/// Source of "who is in a tournament with this wallet". Read-only; a failed
/// lookup never affects the conversation store.
pub trait RosterGateway: Send + Sync {
    fn co_participants(
        &self,
        wallet: &WalletId,
    ) -> impl Future<Output = Result<Vec<Participant>, ChatError>> + Send;
}

/// Fetches the full roster from `{base_url}/games` on every lookup.
#[derive(Clone)]
pub struct HttpRoster {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRoster {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::UpstreamUnavailable(format!("HTTP client setup: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn games_url(&self) -> String {
        format!("{}/games", self.base_url)
    }

    async fn fetch_games(&self) -> Result<GamesDocument, ChatError> {
        let url = self.games_url();
        let resp = self.client.get(&url).send().await.map_err(|e| {
            warn!("Roster request to {} failed: {}", url, e);
            ChatError::UpstreamUnavailable(format!("request failed: {}", e))
        })?;

        let status = resp.status();
        if !status.is_success() {
            warn!("Roster service answered {} for {}", status, url);
            return Err(ChatError::UpstreamUnavailable(format!(
                "roster service returned {}",
                status
            )));
        }

        resp.json::<GamesDocument>().await.map_err(|e| {
            warn!("Roster response from {} was not understood: {}", url, e);
            ChatError::UpstreamUnavailable(format!("invalid roster response: {}", e))
        })
    }
}

impl RosterGateway for HttpRoster {
    async fn co_participants(&self, wallet: &WalletId) -> Result<Vec<Participant>, ChatError> {
        let games = self.fetch_games().await?;
        let peers = co_participants(&games, wallet);
        debug!("Roster: {} has {} co-participants", wallet, peers.len());
        Ok(peers)
    }
}
