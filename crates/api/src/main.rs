//! Subsite API server

use std::sync::Arc;

use anyhow::Context;
use subsite_api::{
    config::{Config, LogFormat},
    hosting::VercelClient,
    routes::create_router,
    store,
    AppState,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real deployments set the environment directly
    let _ = dotenvy::dotenv();

    let config = Config::from_env().context("invalid configuration")?;
    init_tracing(config.log_format);

    let stores = store::connect(&config)
        .await
        .context("failed to initialise tenant store")?;
    let hosting = VercelClient::new(&config.hosting, &config.root_domain)
        .context("failed to initialise hosting client")?;

    let bind_address = config.bind_address.clone();
    tracing::info!(
        root_domain = %config.root_domain,
        reserved = ?config.reserved_subdomains,
        override_param = ?config.routing_override_param,
        store = stores.tenants.backend_name(),
        "Starting subsite-api"
    );

    let state = AppState::new(config, stores.tenants, stores.content, Arc::new(hosting));
    let app = create_router(state)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    tracing::info!(addr = %bind_address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("subsite_api=info,tower_http=info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
