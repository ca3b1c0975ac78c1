//! RoboBox HTTP Server
//!
//! Serves the RoboBox site API: discount reveal, FAQ assistant, catalog,
//! workshops, school enquiries and the admin back-office.

use anyhow::Result;
use robobox_server::{api, bootstrap, config::ServerConfig};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first so log_level can seed the filter
    let config = ServerConfig::load()?;

    init_tracing(&config.log_level)?;
    info!(
        "Loaded configuration: provider={:?} model={} store={:?}",
        config.llm.provider, config.llm.model, config.store.backend
    );

    let state = bootstrap::init_state(&config).await?;
    info!("Application state initialized");

    let app = api::create_router(state);

    let addr = config.addr();
    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    info!("✓ Server listening on http://{}", addr);
    info!("  Health check: http://{}/health", addr);
    info!("  FAQ: POST http://{}/v1/faq", addr);
    info!("  Discount reveal: POST http://{}/v1/reveal", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing(log_level: &str) -> Result<()> {
    let default_filter = format!(
        "robobox_server={level},robobox_llm={level},robobox_store={level},tower_http=debug",
        level = log_level
    );

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}
