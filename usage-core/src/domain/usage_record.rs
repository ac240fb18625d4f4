use time::Date;

/// One row of the daily usage sheet after normalization.
///
/// Only `date` is guaranteed. Every numeric field is `None` when the source
/// cell was blank or could not be coerced to a number.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UsageRecord {
    pub date: Date,
    pub unit1_usage: Option<f64>,
    pub unit2_usage: Option<f64>,
    pub total_usage: Option<f64>,
    pub hop_days: Option<f64>,
    pub flowrate_mt_per_hour: Option<f64>,
    pub discharge_volume_mt: Option<f64>,
    pub unload_duration_hours: Option<f64>,
    pub wait_duration_hours: Option<f64>,
    pub supplier: Option<String>,
}

impl UsageRecord {
    /// A record for `date` with every other field empty.
    pub fn on(date: Date) -> Self {
        Self {
            date,
            unit1_usage: None,
            unit2_usage: None,
            total_usage: None,
            hop_days: None,
            flowrate_mt_per_hour: None,
            discharge_volume_mt: None,
            unload_duration_hours: None,
            wait_duration_hours: None,
            supplier: None,
        }
    }
}

/// A loosely typed cell as produced by a spreadsheet or CSV reader.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Date(Date),
}

impl From<&str> for RawCell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text(s.to_string())
        }
    }
}

impl From<f64> for RawCell {
    fn from(v: f64) -> Self {
        RawCell::Number(v)
    }
}

/// Header row plus data rows, exactly as fetched. Rows may be ragged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<RawCell>>) -> Self {
        Self { headers, rows }
    }

    /// Index of the column whose label matches `label` verbatim.
    pub fn column(&self, label: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == label)
    }
}

/// Normalized rows in source order. Rebuilt from scratch on every load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedTable {
    records: Vec<UsageRecord>,
}

impl NormalizedTable {
    pub fn records(&self) -> &[UsageRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UsageRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<UsageRecord>> for NormalizedTable {
    fn from(records: Vec<UsageRecord>) -> Self {
        Self { records }
    }
}

impl FromIterator<UsageRecord> for NormalizedTable {
    fn from_iter<I: IntoIterator<Item = UsageRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a NormalizedTable {
    type Item = &'a UsageRecord;
    type IntoIter = std::slice::Iter<'a, UsageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
