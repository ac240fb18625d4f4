use std::{
    fs::File,
    path::{Path, PathBuf},
};

use usage_core::{RawCell, RawTable};

use super::TableSource;
use crate::error::DashboardError;

/// Local CSV export of the usage sheet.
///
/// The header row must carry the same labels as the spreadsheet. Every cell
/// is read as text and left to the normalizer to coerce.
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

fn read_table(path: &Path) -> Result<RawTable, DashboardError> {
    let file = File::open(path)
        .map_err(|e| DashboardError::Fetch(format!("failed to open CSV file: {e}")))?;
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| DashboardError::Parse(format!("failed to read CSV headers: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows: Vec<Vec<RawCell>> = Vec::new();
    for result in rdr.records() {
        let record =
            result.map_err(|e| DashboardError::Parse(format!("failed to read CSV record: {e}")))?;
        rows.push(record.iter().map(RawCell::from).collect());
    }

    Ok(RawTable::new(headers, rows))
}

#[async_trait::async_trait]
impl TableSource for CsvFileSource {
    async fn load(&self) -> Result<RawTable, DashboardError> {
        // The csv reader is blocking; keep it off the async workers.
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_table(&path))
            .await
            .map_err(|e| DashboardError::Fetch(format!("CSV reader task failed: {e}")))?
    }

    fn describe(&self) -> String {
        format!("csv {}", self.path.display())
    }
}
