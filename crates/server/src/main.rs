mod auth;
mod bootstrap;
mod dashboard;
mod health;
mod productos;
mod service;
mod templates;

use std::time::Duration;

use anyhow::Result;
use inventario_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use inventario_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    // Bootstrap using the same config we already loaded
    let app = bootstrap::bootstrap_with_config(config).await?;

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(
        event_name = "system.server.started",
        bind_address = %address,
        "inventario-server listening"
    );

    let shutdown_grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    let router = bootstrap::app_router(app.state, app.db_pool.clone());

    axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown()).await?;

    tracing::info!(event_name = "system.server.stopping", "inventario-server stopping");

    // Let in-flight statements finish before dropping the pool.
    tokio::time::timeout(shutdown_grace, app.db_pool.close()).await.ok();

    Ok(())
}

async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}
