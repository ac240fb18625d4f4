use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins when set; otherwise the service and core log at info.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("dashboard_service=info,usage_core=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
