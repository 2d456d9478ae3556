use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tracing::info;

use super::{connect_and_migrate, load_config};
use crate::app::app;
use crate::database::{MemoryStore, PgStore, Store};
use crate::state::AppState;

#[derive(Args, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Keep all data in process memory instead of Postgres")]
    pub memory: bool,

    #[arg(long, help = "Port to listen on (overrides PORT / INVENTORY_API_PORT)")]
    pub port: Option<u16>,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config()?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    info!("Starting Inventory API in {:?} mode", config.environment);

    let store: Arc<dyn Store> = if args.memory {
        info!("Using in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(PgStore::new(connect_and_migrate(&config).await?))
    };

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Inventory API listening on http://{}", bind_addr);

    axum::serve(listener, app(AppState::new(config, store)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
