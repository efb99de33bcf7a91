use plotstats::render::fonts::ensure_chart_font;
use plotstats::{build_router, AppState, ServerConfig};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), String> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env().map_err(|e| {
        error!("Invalid configuration: {e}");
        e.to_string()
    })?;

    ensure_chart_font(config.font_path.as_deref());

    let state = AppState::from_config(&config);
    info!(
        "Plot store: {} ({:?}), chart theme: {}",
        state.store.backend_tag(),
        config.plot_dir,
        config.chart_theme
    );

    let listener = TcpListener::bind(config.bind_addr).await.map_err(|e| {
        error!("Cannot bind {}: {e}", config.bind_addr);
        e.to_string()
    })?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("Server stopped with error: {e}");
            e.to_string()
        })
}
