//! Proximity Server - HTTP front end for single proximity checks

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use proximity_link::MavlinkConnector;
use proximity_server::{api, config::Config, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("proximity_server=debug".parse()?)
                .add_directive("proximity_core=info".parse()?)
                .add_directive("proximity_link=info".parse()?),
        )
        .init();

    tracing::info!("Starting Proximity Server...");

    let config = Config::from_env();
    let port = config.server_port;
    tracing::info!(
        read_timeout_ms = config.read_timeout.as_millis() as u64,
        hthresh = config.default_thresholds.horizontal_m,
        vthresh = config.default_thresholds.vertical_m,
        "Configuration loaded"
    );

    let connector = MavlinkConnector::new(config.mavlink);
    let state = Arc::new(AppState::new(connector, config));

    let app = api::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Proximity Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
    }
    tracing::info!("Shutdown signal received");
}
