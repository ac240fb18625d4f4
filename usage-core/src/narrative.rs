//! Plain-text prompt for the narrative summary.

use std::{
    collections::BTreeSet,
    fmt::{self, Write},
};

use crate::report::DashboardReport;

/// Two decimals, or `N/A`.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "N/A".to_string(),
    }
}

fn with_unit(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(_) => format!("{} {unit}", format_value(value)),
        None => format_value(None),
    }
}

pub fn compose_prompt(report: &DashboardReport) -> String {
    let mut out = String::new();
    let _ = write_prompt(&mut out, report);
    out
}

fn write_prompt(out: &mut String, report: &DashboardReport) -> fmt::Result {
    let s = &report.summary;

    writeln!(
        out,
        "You are an analyst for the PLTU Anggrek power plant. Write a short narrative \
         summary in Bahasa Indonesia of the fuel usage data below. Highlight notable \
         trends, the supplier mix and anything that needs attention."
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "Period: {} (as of {}, {} of {} records)",
        report.period_label, report.today, report.filtered_records, report.total_records
    )?;
    writeln!(out, "Unit 1 usage: {}", with_unit(s.unit1_total, "MT"))?;
    writeln!(out, "Unit 2 usage: {}", with_unit(s.unit2_total, "MT"))?;
    writeln!(out, "Total usage: {}", with_unit(s.total_usage, "MT"))?;
    writeln!(out, "Average usage per unit: {}", with_unit(s.avg_unit_usage, "MT"))?;
    writeln!(out, "Average HOP: {}", with_unit(s.avg_hop_days, "days"))?;

    if !report.monthly.is_empty() {
        writeln!(out)?;
        writeln!(out, "Monthly averages (volume MT, flowrate MT/day):")?;
        for m in &report.monthly {
            writeln!(
                out,
                "- {}: volume {}, flowrate {}, unload {} h, wait {} h",
                m.month,
                format_value(m.avg_discharge_volume_mt),
                format_value(m.flowrate_mt_per_day),
                format_value(m.avg_unload_duration_hours),
                format_value(m.avg_wait_duration_hours),
            )?;
        }
    }

    // Every supplier seen in the table, including ones with no recorded volume.
    let names: BTreeSet<&str> = report
        .supplier_monthly
        .iter()
        .map(|m| m.supplier.as_str())
        .chain(report.supplier_totals.iter().map(|t| t.supplier.as_str()))
        .collect();

    writeln!(out)?;
    if names.is_empty() {
        writeln!(out, "Suppliers: none recorded")?;
    } else {
        let names: Vec<&str> = names.into_iter().collect();
        writeln!(out, "Suppliers: {}", names.join(", "))?;
    }
    for t in &report.supplier_totals {
        writeln!(
            out,
            "- {}: total volume {} MT",
            t.supplier,
            format_value(Some(t.discharge_volume_mt))
        )?;
    }
    writeln!(
        out,
        "Top supplier by volume: {}",
        report.top_supplier.as_deref().unwrap_or("N/A")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        aggregate::RowMeanPolicy,
        domain::{NormalizedTable, PeriodSelection, UsageRecord},
        report::build_report,
    };
    use time::macros::date;

    #[test]
    fn values_use_two_decimals_or_na() {
        assert_eq!(format_value(Some(3.14159)), "3.14");
        assert_eq!(format_value(Some(10.0)), "10.00");
        assert_eq!(format_value(None), "N/A");
    }

    #[test]
    fn prompt_lists_summary_suppliers_and_top_supplier() {
        let table = NormalizedTable::from(vec![
            UsageRecord {
                unit1_usage: Some(120.5),
                unit2_usage: Some(99.25),
                supplier: Some("Alpha".into()),
                discharge_volume_mt: Some(1000.0),
                ..UsageRecord::on(date!(2024 - 06 - 10))
            },
            UsageRecord {
                supplier: Some("Beta".into()),
                discharge_volume_mt: Some(2500.0),
                flowrate_mt_per_hour: Some(10.0),
                ..UsageRecord::on(date!(2024 - 06 - 11))
            },
        ]);
        let report = build_report(
            &table,
            Some(PeriodSelection::ThisMonth),
            date!(2024 - 06 - 15),
            RowMeanPolicy::AnyPresent,
        );

        let prompt = compose_prompt(&report);
        assert!(prompt.contains("Period: Bulan Ini"));
        assert!(prompt.contains("Unit 1 usage: 120.50 MT"));
        assert!(prompt.contains("Total usage: N/A"));
        assert!(prompt.contains("Average HOP: N/A"));
        assert!(prompt.contains("Suppliers: Alpha, Beta"));
        assert!(prompt.contains("flowrate 240.00"));
        assert!(prompt.contains("Top supplier by volume: Beta"));
    }

    #[test]
    fn empty_report_still_composes() {
        let report = build_report(
            &NormalizedTable::default(),
            Some(PeriodSelection::Yesterday),
            date!(2024 - 06 - 15),
            RowMeanPolicy::AnyPresent,
        );

        let prompt = compose_prompt(&report);
        assert!(prompt.contains("Unit 1 usage: N/A"));
        assert!(prompt.contains("Suppliers: none recorded"));
        assert!(prompt.contains("Top supplier by volume: N/A"));
    }

    #[test]
    fn suppliers_without_volume_are_still_named() {
        let table = NormalizedTable::from(vec![
            UsageRecord {
                supplier: Some("Alpha".into()),
                discharge_volume_mt: Some(1.0),
                ..UsageRecord::on(date!(2024 - 06 - 10))
            },
            UsageRecord {
                supplier: Some("Gamma".into()),
                flowrate_mt_per_hour: Some(12.0),
                ..UsageRecord::on(date!(2024 - 06 - 11))
            },
        ]);
        let report = build_report(
            &table,
            Some(PeriodSelection::ThisMonth),
            date!(2024 - 06 - 15),
            RowMeanPolicy::AnyPresent,
        );

        let prompt = compose_prompt(&report);
        assert!(prompt.contains("Suppliers: Alpha, Gamma"));
        assert!(prompt.contains("- Alpha: total volume 1.00 MT"));
        assert!(!prompt.contains("- Gamma: total volume"));
    }
}
