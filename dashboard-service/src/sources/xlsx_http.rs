use std::{io::Cursor, time::Duration};

use calamine::{Data, Reader, Xlsx};
use time::{macros::date, Date};
use usage_core::{RawCell, RawTable};

use super::TableSource;
use crate::error::DashboardError;

/// Downloads the usage workbook as xlsx and reads one named sheet.
///
/// The first row of the sheet's used range is the header row.
pub struct XlsxHttpSource {
    client: reqwest::Client,
    url: String,
    sheet_name: String,
}

impl XlsxHttpSource {
    pub fn new(url: &str, sheet_name: &str, timeout: Duration) -> Result<Self, DashboardError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::Fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.to_string(),
            sheet_name: sheet_name.to_string(),
        })
    }

    async fn download(&self) -> Result<Vec<u8>, DashboardError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| DashboardError::Fetch(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Fetch(format!(
                "spreadsheet download returned HTTP {status}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DashboardError::Fetch(format!("failed to read response body: {e}")))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl TableSource for XlsxHttpSource {
    async fn load(&self) -> Result<RawTable, DashboardError> {
        let bytes = self.download().await?;
        tracing::debug!(bytes = bytes.len(), url = %self.url, "spreadsheet downloaded");
        parse_workbook(&bytes, &self.sheet_name)
    }

    fn describe(&self) -> String {
        format!("xlsx {} [{}]", self.url, self.sheet_name)
    }
}

/// Parse xlsx bytes and return `sheet_name` as a [`RawTable`].
pub fn parse_workbook(bytes: &[u8], sheet_name: &str) -> Result<RawTable, DashboardError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| DashboardError::Parse(format!("failed to open workbook: {e}")))?;

    if !workbook.sheet_names().iter().any(|n| n == sheet_name) {
        return Err(DashboardError::Parse(format!("sheet '{sheet_name}' not found")));
    }

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| DashboardError::Parse(format!("failed to read sheet '{sheet_name}': {e}")))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(header_text).collect(),
        None => Vec::new(),
    };
    let rows: Vec<Vec<RawCell>> = rows.map(|row| row.iter().map(to_raw_cell).collect()).collect();

    Ok(RawTable::new(headers, rows))
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Excel's day zero for the 1900 date system, adjusted for the phantom
/// 1900-02-29.
const EXCEL_EPOCH: Date = date!(1899 - 12 - 30);

pub fn excel_serial_to_date(serial: f64) -> Option<Date> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    EXCEL_EPOCH.checked_add(time::Duration::days(serial.floor() as i64))
}

fn to_raw_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty | Data::Error(_) => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Float(v) => RawCell::Number(*v),
        Data::Int(v) => RawCell::Number(*v as f64),
        Data::Bool(b) => RawCell::Text(b.to_string()),
        Data::DateTime(dt) => match excel_serial_to_date(dt.as_f64()) {
            Some(d) if dt.is_datetime() => RawCell::Date(d),
            _ => RawCell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
    }
}
