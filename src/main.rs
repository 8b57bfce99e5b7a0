//! session-pool-gateway server entry point.
//!
//! Starts the Axum HTTP server with the REST endpoints.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use session_pool_gateway::api;
use session_pool_gateway::app_state::AppState;
use session_pool_gateway::auth::AdminAuthenticator;
use session_pool_gateway::config::{GatewayConfig, LogFormat, StoreBackend};
use session_pool_gateway::domain::PoolRepository;
use session_pool_gateway::issuer::{CredentialIssuer, HttpIssuer};
use session_pool_gateway::persistence::{CloudflareKvStore, MemoryStore, PoolStore};
use session_pool_gateway::service::{IssuerSettings, PoolService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(config = ?config, "starting session-pool-gateway");

    if config.error_tracking_dsn.is_some() {
        tracing::info!("error tracking endpoint configured");
    }

    // Build persistence layer
    let store: Arc<dyn PoolStore> = match &config.store {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; the pool is lost on restart");
            Arc::new(MemoryStore::new(config.pool_key.clone()))
        }
        StoreBackend::CloudflareKv(settings) => Arc::new(
            CloudflareKvStore::new(settings, &config.pool_key, config.store_timeout())
                .context("failed to build Workers KV client")?,
        ),
    };

    // Build service layer
    let repository = PoolRepository::new(store, config.store_timeout());
    let issuer: Arc<dyn CredentialIssuer> = Arc::new(
        HttpIssuer::new(config.issuer_timeout()).context("failed to build issuer client")?,
    );
    let authenticator = AdminAuthenticator::new(config.admin_password.as_deref());
    if !authenticator.is_enabled() {
        tracing::warn!("ADMIN_PASSWORD is not set; admin endpoints will reject every request");
    }
    let pool_service = PoolService::new(
        repository,
        issuer,
        authenticator,
        IssuerSettings {
            base_url: config.issuer_base_url.clone(),
            timeout: config.issuer_timeout(),
        },
    );

    // Build router
    let app = api::build_app(AppState::new(pool_service), config.request_timeout());

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
