//! Domain types: identifiers, column keys, period codes, time ranges.

pub mod ids;
pub mod period;
pub mod range;

pub use ids::{ColumnKey, Identifier};
pub use period::{PeriodCode, PeriodError, PeriodKey, Periodicity};
pub use range::{RangeParseError, TimeRangeSpec};
