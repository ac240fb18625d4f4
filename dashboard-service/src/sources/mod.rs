pub mod cache;
pub mod csv_file;
pub mod xlsx_http;

pub use cache::SnapshotCache;
pub use csv_file::CsvFileSource;
pub use xlsx_http::XlsxHttpSource;

use std::{sync::Arc, time::Duration};

use usage_core::RawTable;

use crate::{
    config::{SourceConfig, SourceKind},
    error::DashboardError,
};

/// Anything that can produce the raw usage table.
#[async_trait::async_trait]
pub trait TableSource: Send + Sync {
    async fn load(&self) -> Result<RawTable, DashboardError>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

pub fn from_config(cfg: &SourceConfig) -> anyhow::Result<Arc<dyn TableSource>> {
    let source: Arc<dyn TableSource> = match cfg.kind {
        SourceKind::XlsxUrl => Arc::new(XlsxHttpSource::new(
            &cfg.url,
            &cfg.sheet_name,
            Duration::from_secs(cfg.timeout_secs),
        )?),
        SourceKind::CsvFile => {
            let path = cfg
                .path
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("source.path is required for kind = \"csv_file\""))?;
            Arc::new(CsvFileSource::new(path))
        }
    };
    Ok(source)
}
