//! Tournament chat relay daemon.
//!
//! Serves the chat HTTP API, keeping conversations in a JSON file under the
//! data directory and asking the games service (`--roster-url`) who shares a
//! tournament with whom.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tourney_relay::config::Cli;
use tourney_relay::{router, ChatService, ConversationStore, HttpRoster};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tourney_relay=info,tower_http=info")),
        )
        .init();

    let data_dir = cli.data_dir();
    let store = ConversationStore::open_or_initialize(&data_dir)
        .with_context(|| format!("failed to open chat store in {}", data_dir.display()))?;

    let roster = HttpRoster::new(cli.roster_url.clone(), cli.roster_timeout())
        .context("failed to build roster client")?;
    info!(
        "Roster lookups via {} (timeout {}s)",
        roster.games_url(),
        cli.roster_timeout_secs
    );

    let service = Arc::new(ChatService::new(Arc::new(store), roster));
    let app = router(service);

    let addr = cli.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Chat relay listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    info!("Chat relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until killed.
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
