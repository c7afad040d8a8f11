use dotenvy::dotenv;
use marketplace_frontend::config::get_configuration;
use marketplace_frontend::services::metrics::init_metrics;
use marketplace_frontend::startup::build_router;
use marketplace_frontend::AppState;
use service_core::observability::logging::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "marketplace-frontend",
        &configuration.observability.log_level,
        configuration.observability.otlp_endpoint.as_deref(),
    );

    init_metrics().map_err(|e| {
        tracing::error!("Failed to install metrics recorder: {}", e);
        anyhow::anyhow!("Metrics error: {}", e)
    })?;

    let state = AppState::from_settings(&configuration);
    info!(
        cookie_max_age = state.cookie_max_age,
        backend = %configuration.backend.url,
        "Loaded configuration"
    );

    let app = build_router(state, &configuration.server.public_dir);

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting marketplace-frontend on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
