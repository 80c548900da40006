use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Default roster lookup timeout (seconds).
pub const DEFAULT_ROSTER_TIMEOUT_SECS: u64 = 10;

#[derive(Parser, Debug, Clone)]
#[command(name = "tourney-relay", about = "Tournament chat relay")]
pub struct Cli {
    /// HTTP port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// Address to bind.
    #[arg(long = "bind", env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind_addr: String,

    /// Directory holding chat_conversations.json and chat_users.json
    /// (default: <data dir>/tourney-chat).
    #[arg(long, env = "CHAT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Base URL of the games service that serves `/games`.
    #[arg(long, env = "ROSTER_URL", default_value = "http://localhost:3000")]
    pub roster_url: String,

    /// Timeout for roster lookups, in seconds.
    #[arg(
        long,
        env = "ROSTER_TIMEOUT_SECS",
        default_value_t = DEFAULT_ROSTER_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub roster_timeout_secs: u64,
}

impl Cli {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn roster_timeout(&self) -> Duration {
        Duration::from_secs(self.roster_timeout_secs)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("tourney-chat"))
        .unwrap_or_else(|| PathBuf::from("data"))
}
