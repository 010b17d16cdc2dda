// Gatherly API server
// Decision: Dev mode (no DATABASE_URL) runs with in-memory storage
// Decision: Auth defaults to "none" for local development

use anyhow::{Context, Result};
use gatherly_control_plane::auth::AuthConfig;
use gatherly_control_plane::{Gatherly, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // RUST_LOG overrides the default filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("gatherly_control_plane=debug,gatherly_core=debug,tower_http=debug")
            }),
        )
        .init();

    tracing::info!("gatherly-api starting...");

    let config = ServerConfig::from_env();
    let auth_config = AuthConfig::from_env();

    let gatherly = Gatherly::init(&config, auth_config).await?;
    let app = gatherly.router();

    // Start HTTP server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("gatherly-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
