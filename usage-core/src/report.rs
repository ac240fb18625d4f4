use time::Date;

use crate::{
    aggregate::{
        monthly_aggregates, summarize, supplier_monthly_flowrate, supplier_totals, top_supplier,
        MonthlyAggregate, RowMeanPolicy, SummaryStats, SupplierMonthlyAggregate, SupplierTotal,
    },
    domain::{NormalizedTable, PeriodSelection},
    filter::filter_by_period,
};

/// Label used when no known period was selected and nothing was filtered.
pub const UNFILTERED_LABEL: &str = "Semua Data";

/// One point of the daily usage trend chart.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TrendPoint {
    pub date: Date,
    pub unit1_usage: Option<f64>,
    pub unit2_usage: Option<f64>,
    pub total_usage: Option<f64>,
}

/// Everything the presentation layer needs for one period selection.
///
/// `summary` and `trend` cover the filtered rows. The three aggregate tables
/// always cover the whole table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DashboardReport {
    pub period: Option<PeriodSelection>,
    pub period_label: String,
    pub today: Date,
    pub total_records: usize,
    pub filtered_records: usize,
    pub summary: SummaryStats,
    pub trend: Vec<TrendPoint>,
    pub monthly: Vec<MonthlyAggregate>,
    pub supplier_monthly: Vec<SupplierMonthlyAggregate>,
    pub supplier_totals: Vec<SupplierTotal>,
    pub top_supplier: Option<String>,
}

pub fn build_report(
    table: &NormalizedTable,
    period: Option<PeriodSelection>,
    today: Date,
    policy: RowMeanPolicy,
) -> DashboardReport {
    let filtered = filter_by_period(table, period, today);

    let trend = filtered
        .iter()
        .map(|r| TrendPoint {
            date: r.date,
            unit1_usage: r.unit1_usage,
            unit2_usage: r.unit2_usage,
            total_usage: r.total_usage,
        })
        .collect();

    let totals = supplier_totals(table.records());
    let top = top_supplier(&totals).map(|t| t.supplier.clone());

    DashboardReport {
        period,
        period_label: period
            .map(|p| p.label().to_string())
            .unwrap_or_else(|| UNFILTERED_LABEL.to_string()),
        today,
        total_records: table.len(),
        filtered_records: filtered.len(),
        summary: summarize(filtered.records(), policy),
        trend,
        monthly: monthly_aggregates(table.records(), None),
        supplier_monthly: supplier_monthly_flowrate(table.records()),
        supplier_totals: totals,
        top_supplier: top,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UsageRecord;
    use time::macros::date;

    fn sample() -> NormalizedTable {
        NormalizedTable::from(vec![
            UsageRecord {
                unit1_usage: Some(100.0),
                unit2_usage: Some(80.0),
                total_usage: Some(180.0),
                hop_days: Some(12.0),
                supplier: Some("Alpha".into()),
                discharge_volume_mt: Some(5000.0),
                flowrate_mt_per_hour: Some(400.0),
                ..UsageRecord::on(date!(2024 - 06 - 14))
            },
            UsageRecord {
                unit1_usage: Some(90.0),
                unit2_usage: Some(70.0),
                total_usage: Some(160.0),
                supplier: Some("Beta".into()),
                discharge_volume_mt: Some(7000.0),
                flowrate_mt_per_hour: Some(350.0),
                ..UsageRecord::on(date!(2024 - 05 - 02))
            },
        ])
    }

    #[test]
    fn summary_covers_period_but_supplier_totals_cover_everything() {
        let report = build_report(
            &sample(),
            Some(PeriodSelection::Yesterday),
            date!(2024 - 06 - 15),
            RowMeanPolicy::AnyPresent,
        );

        assert_eq!(report.filtered_records, 1);
        assert_eq!(report.total_records, 2);
        assert_eq!(report.summary.unit1_total, Some(100.0));
        assert_eq!(report.trend.len(), 1);
        assert_eq!(report.supplier_totals.len(), 2);
        assert_eq!(report.monthly.len(), 2);
        assert_eq!(report.top_supplier.as_deref(), Some("Beta"));
        assert_eq!(report.period_label, "Kemarin");
    }

    #[test]
    fn empty_period_is_a_normal_report() {
        let report = build_report(
            &sample(),
            Some(PeriodSelection::ThisYear),
            date!(2030 - 01 - 01),
            RowMeanPolicy::AnyPresent,
        );

        assert_eq!(report.filtered_records, 0);
        assert!(report.summary.is_empty());
        assert!(report.trend.is_empty());
        assert!(!report.monthly.is_empty());
    }

    #[test]
    fn empty_table_produces_empty_report() {
        let report = build_report(
            &NormalizedTable::default(),
            Some(PeriodSelection::ThisMonth),
            date!(2024 - 06 - 15),
            RowMeanPolicy::BothPresent,
        );

        assert!(report.summary.is_empty());
        assert!(report.monthly.is_empty());
        assert!(report.supplier_monthly.is_empty());
        assert!(report.supplier_totals.is_empty());
        assert_eq!(report.top_supplier, None);
    }

    #[test]
    fn unknown_period_uses_whole_table() {
        let report = build_report(
            &sample(),
            None,
            date!(2024 - 06 - 15),
            RowMeanPolicy::AnyPresent,
        );
        assert_eq!(report.filtered_records, 2);
        assert_eq!(report.period_label, UNFILTERED_LABEL);
        assert_eq!(report.summary.total_usage, Some(340.0));
    }
}
