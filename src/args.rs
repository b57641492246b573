use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "game-ledger", about = "Track pickup game results and player win/loss records")]
pub struct Args {
    /// SQLite connection URL; defaults to ledger.db in the platform data directory
    #[arg(long, env = "GAME_LEDGER_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address the HTTP server listens on
    #[arg(long, env = "GAME_LEDGER_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Directory for daily rolling log files (stdout only when unset)
    #[arg(long, env = "GAME_LEDGER_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Maximum pooled database connections
    #[arg(long, env = "GAME_LEDGER_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_filter: String,
}
