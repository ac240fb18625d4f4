use axum::{routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROM_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the global Prometheus recorder. Later calls reuse the first one.
pub fn install() -> anyhow::Result<()> {
    PROM_HANDLE.get_or_try_init(|| PrometheusBuilder::new().install_recorder())?;
    Ok(())
}

/// Routes serving the rendered metrics at `route`, for merging into the
/// dashboard router.
pub fn router<S>(route: &str) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(route, get(metrics_handler))
}

async fn metrics_handler() -> String {
    PROM_HANDLE
        .get()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}
