use anyhow::Result;
use dashboard_service::{config::AppConfig, metrics_server, observability, routes};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    if cfg.metrics.is_some() {
        metrics_server::install()?;
    }

    let state = routes::AppState::from_config(&cfg)?;
    tracing::info!(
        source = %state.cache.describe_source(),
        summarizer = state.summarizer.is_some(),
        default_period = %state.default_period,
        "dashboard state initialised"
    );

    let app = routes::router(state, cfg.metrics.as_ref());

    let listener = tokio::net::TcpListener::bind(&cfg.server.bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {e}", cfg.server.bind_addr))?;
    tracing::info!(addr = %cfg.server.bind_addr, "dashboard service listening");

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
