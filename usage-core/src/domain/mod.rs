pub mod period;
pub mod usage_record;

pub use period::{PeriodSelection, UnknownPeriod};
pub use usage_record::{NormalizedTable, RawCell, RawTable, UsageRecord};
