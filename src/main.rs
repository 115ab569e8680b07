mod actor_framework;
mod api;
mod app_system;
mod checkout;
mod clients;
mod dispatch;
mod domain;
mod feedback_actor;
mod loyalty_actor;
mod order_actor;
mod persistence;
mod product_actor;
mod reports;
mod staff_actor;

#[cfg(test)]
mod mock_framework;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::api::{build_app, AppState};
use crate::app_system::{setup_tracing, Config, StorefrontSystem};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal outside development.
    let _ = dotenvy::dotenv();

    let config = Config::from_env().context("reading configuration")?;
    let _log_guard = setup_tracing(config.log_dir.as_deref());

    info!(port = config.http_port, data_dir = ?config.data_dir, "Starting juice storefront");
    if config.admin_token.is_none() {
        warn!("ADMIN_TOKEN is not set; admin routes will refuse every request");
    }

    let system = StorefrontSystem::start(&config).await.context("starting actors")?;
    let app = build_app(AppState::new(&system, config.admin_token.clone()), config.request_timeout);

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr).await.with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    system.shutdown().await?;
    info!("Application stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
