use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use game_ledger::{
    api::{AppState, build_router},
    args::Args,
    db::{create_pool, default_database_url},
    logging::init_logging,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(&args.log_filter, args.log_dir.as_deref())?;

    let database_url = match args.database_url {
        Some(url) => url,
        None => default_database_url()?,
    };
    let pool = create_pool(&database_url, args.max_connections).await?;

    let app = build_router(AppState::new(pool.clone()));

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    info!(addr = %args.bind, "game-ledger listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
