//! Coercion of raw sheet rows into [`UsageRecord`]s.
//!
//! Column labels must match the sheet verbatim, including the embedded line
//! break in the HOP column.

use time::{macros::format_description, Date};

use crate::domain::{NormalizedTable, RawCell, RawTable, UsageRecord};

pub const COL_DATE: &str = "Tanggal";
pub const COL_UNIT1: &str = "PEMAKAIAN UNIT 1";
pub const COL_UNIT2: &str = "PEMAKAIAN UNIT 2";
pub const COL_TOTAL: &str = "TOTAL PEMAKAIAN";
pub const COL_HOP: &str = "HOP\n (HARI)";
pub const COL_FLOWRATE: &str = "Flowrate (MT/hours)";
pub const COL_DISCHARGE: &str = "DS (MT)";
pub const COL_UNLOAD: &str = "Durasi Bongkar (Hours)";
pub const COL_WAIT: &str = "Durasi Tunggu (Hours)";
pub const COL_SUPPLIER: &str = "Suppliers";

pub const NUMERIC_COLUMNS: [&str; 8] = [
    COL_UNIT1,
    COL_UNIT2,
    COL_TOTAL,
    COL_HOP,
    COL_FLOWRATE,
    COL_DISCHARGE,
    COL_UNLOAD,
    COL_WAIT,
];

/// What happened during one normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub dropped_rows: usize,
    /// Expected columns that were absent from the header row.
    pub missing_columns: Vec<&'static str>,
}

/// Coerce a cell to a finite number, or `None`.
pub fn coerce_numeric(cell: &RawCell) -> Option<f64> {
    let v = match cell {
        RawCell::Number(v) => *v,
        RawCell::Text(s) => s.trim().parse::<f64>().ok()?,
        RawCell::Empty | RawCell::Date(_) => return None,
    };
    v.is_finite().then_some(v)
}

/// Coerce a cell to a calendar date.
///
/// Text is accepted as `YYYY-MM-DD` (optionally followed by a time part after
/// a space or `T`) or as day-first `DD/MM/YYYY`.
pub fn coerce_date(cell: &RawCell) -> Option<Date> {
    match cell {
        RawCell::Date(d) => Some(*d),
        RawCell::Text(s) => parse_date_text(s.trim()),
        RawCell::Empty | RawCell::Number(_) => None,
    }
}

fn parse_date_text(s: &str) -> Option<Date> {
    if s.is_empty() {
        return None;
    }

    let iso = format_description!("[year]-[month]-[day]");
    if let Ok(d) = Date::parse(s, iso) {
        return Some(d);
    }

    // Datetime text: keep the date part, ignore whatever time follows.
    if let (Some(head), Some(rest)) = (s.get(..10), s.get(10..)) {
        if rest.starts_with(' ') || rest.starts_with('T') {
            if let Ok(d) = Date::parse(head, iso) {
                return Some(d);
            }
        }
    }

    Date::parse(s, format_description!("[day padding:none]/[month padding:none]/[year]")).ok()
}

fn coerce_supplier(cell: &RawCell) -> Option<String> {
    match cell {
        RawCell::Text(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        RawCell::Number(v) => Some(v.to_string()),
        RawCell::Date(d) => Some(d.to_string()),
        RawCell::Empty => None,
    }
}

struct ColumnMap {
    date: usize,
    unit1: Option<usize>,
    unit2: Option<usize>,
    total: Option<usize>,
    hop: Option<usize>,
    flowrate: Option<usize>,
    discharge: Option<usize>,
    unload: Option<usize>,
    wait: Option<usize>,
    supplier: Option<usize>,
}

/// Normalize `raw` into a [`NormalizedTable`].
///
/// Rows whose date cannot be coerced are dropped. Numeric cells that cannot
/// be coerced become `None` and the row is kept. An empty table or a missing
/// date column yields an empty result rather than an error.
pub fn normalize(raw: &RawTable) -> (NormalizedTable, NormalizeReport) {
    let mut report = NormalizeReport {
        total_rows: raw.rows.len(),
        ..NormalizeReport::default()
    };

    for label in std::iter::once(COL_DATE)
        .chain(NUMERIC_COLUMNS)
        .chain(std::iter::once(COL_SUPPLIER))
    {
        if raw.column(label).is_none() {
            report.missing_columns.push(label);
        }
    }

    let Some(date) = raw.column(COL_DATE) else {
        report.dropped_rows = report.total_rows;
        return (NormalizedTable::default(), report);
    };

    let cols = ColumnMap {
        date,
        unit1: raw.column(COL_UNIT1),
        unit2: raw.column(COL_UNIT2),
        total: raw.column(COL_TOTAL),
        hop: raw.column(COL_HOP),
        flowrate: raw.column(COL_FLOWRATE),
        discharge: raw.column(COL_DISCHARGE),
        unload: raw.column(COL_UNLOAD),
        wait: raw.column(COL_WAIT),
        supplier: raw.column(COL_SUPPLIER),
    };

    let table: NormalizedTable = raw
        .rows
        .iter()
        .filter_map(|row| normalize_row(row, &cols))
        .collect();

    report.kept_rows = table.len();
    report.dropped_rows = report.total_rows - report.kept_rows;
    (table, report)
}

fn normalize_row(row: &[RawCell], cols: &ColumnMap) -> Option<UsageRecord> {
    let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i));
    let num = |idx: Option<usize>| cell(idx).and_then(coerce_numeric);

    let date = cell(Some(cols.date)).and_then(coerce_date)?;

    Some(UsageRecord {
        date,
        unit1_usage: num(cols.unit1),
        unit2_usage: num(cols.unit2),
        total_usage: num(cols.total),
        hop_days: num(cols.hop),
        flowrate_mt_per_hour: num(cols.flowrate),
        discharge_volume_mt: num(cols.discharge),
        unload_duration_hours: num(cols.unload),
        wait_duration_hours: num(cols.wait),
        supplier: cell(cols.supplier).and_then(coerce_supplier),
    })
}
