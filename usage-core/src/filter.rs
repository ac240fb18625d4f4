use time::{Date, Duration};

use crate::domain::{NormalizedTable, PeriodSelection, UsageRecord};

/// Inclusive lower bound `today - days`, saturating at the earliest date.
fn days_back(today: Date, days: i64) -> Date {
    today.checked_sub(Duration::days(days)).unwrap_or(Date::MIN)
}

/// Whether `record` falls inside `period` as seen from `today`.
pub fn in_period(record: &UsageRecord, period: PeriodSelection, today: Date) -> bool {
    let d = record.date;
    match period {
        PeriodSelection::Yesterday => today.previous_day() == Some(d),
        PeriodSelection::LastWeek => d >= days_back(today, 7) && d <= today,
        PeriodSelection::LastMonth => d >= days_back(today, 30),
        PeriodSelection::ThisMonth => d.year() == today.year() && d.month() == today.month(),
        PeriodSelection::ThisYear => d.year() == today.year(),
    }
}

/// Rows of `table` inside `period`, in their original order.
///
/// `None` stands for a period label nobody recognized; in that case the whole
/// table is returned unfiltered.
pub fn filter_by_period(
    table: &NormalizedTable,
    period: Option<PeriodSelection>,
    today: Date,
) -> NormalizedTable {
    match period {
        Some(p) => table
            .iter()
            .filter(|r| in_period(r, p, today))
            .cloned()
            .collect(),
        None => table.clone(),
    }
}
