//! Summary cards and grouped tables.
//!
//! Missing values are skipped everywhere. A statistic with nothing to
//! aggregate is `None`, never `0.0` or `NaN`.

use std::collections::BTreeMap;

use crate::domain::UsageRecord;

/// How a row contributes to the two-unit average when one unit is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RowMeanPolicy {
    /// Average whichever unit values are present; skip rows with neither.
    #[default]
    AnyPresent,
    /// Skip rows unless both unit values are present.
    BothPresent,
}

impl RowMeanPolicy {
    fn row_mean(self, unit1: Option<f64>, unit2: Option<f64>) -> Option<f64> {
        match (unit1, unit2) {
            (Some(a), Some(b)) => Some((a + b) / 2.0),
            (Some(v), None) | (None, Some(v)) if self == Self::AnyPresent => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Sum {
    total: f64,
    seen: bool,
}

impl Sum {
    fn push(&mut self, v: Option<f64>) {
        if let Some(v) = v {
            self.total += v;
            self.seen = true;
        }
    }

    fn value(self) -> Option<f64> {
        self.seen.then_some(self.total)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, v: Option<f64>) {
        if let Some(v) = v {
            self.sum += v;
            self.count += 1;
        }
    }

    fn value(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// The five summary cards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SummaryStats {
    pub unit1_total: Option<f64>,
    pub unit2_total: Option<f64>,
    pub total_usage: Option<f64>,
    pub avg_unit_usage: Option<f64>,
    pub avg_hop_days: Option<f64>,
}

impl SummaryStats {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub fn summarize(records: &[UsageRecord], policy: RowMeanPolicy) -> SummaryStats {
    let mut unit1 = Sum::default();
    let mut unit2 = Sum::default();
    let mut total = Sum::default();
    let mut unit_mean = Mean::default();
    let mut hop = Mean::default();

    for r in records {
        unit1.push(r.unit1_usage);
        unit2.push(r.unit2_usage);
        total.push(r.total_usage);
        unit_mean.push(policy.row_mean(r.unit1_usage, r.unit2_usage));
        hop.push(r.hop_days);
    }

    SummaryStats {
        unit1_total: unit1.value(),
        unit2_total: unit2.value(),
        total_usage: total.value(),
        avg_unit_usage: unit_mean.value(),
        avg_hop_days: hop.value(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct MonthKey {
    year: i32,
    month: u8,
}

impl MonthKey {
    fn of(record: &UsageRecord) -> Self {
        Self {
            year: record.date.year(),
            month: record.date.month() as u8,
        }
    }

    fn label(self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MonthlyAggregate {
    /// `YYYY-MM`.
    pub month: String,
    pub record_count: usize,
    pub avg_flowrate_mt_per_hour: Option<f64>,
    pub avg_discharge_volume_mt: Option<f64>,
    pub avg_unload_duration_hours: Option<f64>,
    pub avg_wait_duration_hours: Option<f64>,
    pub flowrate_mt_per_day: Option<f64>,
}

#[derive(Default)]
struct MonthAcc {
    count: usize,
    flowrate: Mean,
    discharge: Mean,
    unload: Mean,
    wait: Mean,
}

/// Monthly means in ascending month order, optionally limited to one year.
pub fn monthly_aggregates(records: &[UsageRecord], year: Option<i32>) -> Vec<MonthlyAggregate> {
    let mut groups: BTreeMap<MonthKey, MonthAcc> = BTreeMap::new();

    for r in records {
        if year.is_some_and(|y| r.date.year() != y) {
            continue;
        }
        let acc = groups.entry(MonthKey::of(r)).or_default();
        acc.count += 1;
        acc.flowrate.push(r.flowrate_mt_per_hour);
        acc.discharge.push(r.discharge_volume_mt);
        acc.unload.push(r.unload_duration_hours);
        acc.wait.push(r.wait_duration_hours);
    }

    groups
        .into_iter()
        .map(|(key, acc)| {
            let flowrate = acc.flowrate.value();
            MonthlyAggregate {
                month: key.label(),
                record_count: acc.count,
                avg_flowrate_mt_per_hour: flowrate,
                avg_discharge_volume_mt: acc.discharge.value(),
                avg_unload_duration_hours: acc.unload.value(),
                avg_wait_duration_hours: acc.wait.value(),
                flowrate_mt_per_day: flowrate.map(|f| f * 24.0),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SupplierMonthlyAggregate {
    pub month: String,
    pub supplier: String,
    pub avg_flowrate_mt_per_hour: Option<f64>,
}

/// Mean flowrate per (month, supplier), ordered by month then supplier.
/// Rows without a supplier are not grouped.
pub fn supplier_monthly_flowrate(records: &[UsageRecord]) -> Vec<SupplierMonthlyAggregate> {
    let mut groups: BTreeMap<(MonthKey, &str), Mean> = BTreeMap::new();

    for r in records {
        let Some(supplier) = r.supplier.as_deref() else {
            continue;
        };
        groups
            .entry((MonthKey::of(r), supplier))
            .or_default()
            .push(r.flowrate_mt_per_hour);
    }

    groups
        .into_iter()
        .map(|((key, supplier), mean)| SupplierMonthlyAggregate {
            month: key.label(),
            supplier: supplier.to_string(),
            avg_flowrate_mt_per_hour: mean.value(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SupplierTotal {
    pub supplier: String,
    pub discharge_volume_mt: f64,
}

/// Total discharge volume per supplier, ordered by supplier name.
///
/// Callers pass the whole table here, not a period subset. Suppliers without
/// a single discharge-volume value are left out.
pub fn supplier_totals(records: &[UsageRecord]) -> Vec<SupplierTotal> {
    let mut groups: BTreeMap<&str, Sum> = BTreeMap::new();

    for r in records {
        if let Some(supplier) = r.supplier.as_deref() {
            groups.entry(supplier).or_default().push(r.discharge_volume_mt);
        }
    }

    groups
        .into_iter()
        .filter_map(|(supplier, sum)| {
            sum.value().map(|total| SupplierTotal {
                supplier: supplier.to_string(),
                discharge_volume_mt: total,
            })
        })
        .collect()
}

/// Supplier with the largest total volume. Ties go to the first in order.
pub fn top_supplier(totals: &[SupplierTotal]) -> Option<&SupplierTotal> {
    totals.iter().fold(None, |best: Option<&SupplierTotal>, t| match best {
        Some(b) if b.discharge_volume_mt >= t.discharge_volume_mt => Some(b),
        _ => Some(t),
    })
}
