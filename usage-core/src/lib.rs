pub mod aggregate;
pub mod domain;
pub mod filter;
pub mod narrative;
pub mod normalize;
pub mod report;

pub use aggregate::{RowMeanPolicy, SummaryStats};
pub use domain::{NormalizedTable, PeriodSelection, RawCell, RawTable, UsageRecord};
pub use filter::filter_by_period;
pub use normalize::{normalize, NormalizeReport};
pub use report::{build_report, DashboardReport};
