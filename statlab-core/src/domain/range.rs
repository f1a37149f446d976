use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time range '{0}' (expected `all` or `last:<years>`)")]
pub struct RangeParseError(pub String);

/// Time-range filter applied to every fetch.
///
/// Text form is `all` or `last:<n>`, which is also how it appears in config
/// files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeRangeSpec {
    /// The last `n` calendar years, counting the reference year itself.
    LastYears(u32),
    #[default]
    AllTime,
}

impl TimeRangeSpec {
    /// `LastYears(n)` with `n` clamped to at least one year.
    pub fn last_years(n: u32) -> Self {
        Self::LastYears(n.max(1))
    }

    /// First year included, or `None` for an unbounded range.
    ///
    /// `LastYears(n)` against reference year `R` starts at `R - n + 1`.
    pub fn start_year(&self, reference_year: i32) -> Option<i32> {
        match *self {
            Self::AllTime => None,
            Self::LastYears(n) => {
                let span = i32::try_from(n.max(1)).unwrap_or(i32::MAX);
                Some(reference_year.saturating_sub(span - 1))
            }
        }
    }

    pub fn contains_year(&self, year: i32, reference_year: i32) -> bool {
        self.start_year(reference_year)
            .map_or(true, |start| year >= start)
    }
}

impl FromStr for TimeRangeSpec {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::AllTime);
        }
        trimmed
            .strip_prefix("last:")
            .and_then(|n| n.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
            .map(Self::LastYears)
            .ok_or_else(|| RangeParseError(s.to_string()))
    }
}

impl TryFrom<String> for TimeRangeSpec {
    type Error = RangeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeRangeSpec> for String {
    fn from(range: TimeRangeSpec) -> Self {
        range.to_string()
    }
}

impl fmt::Display for TimeRangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllTime => write!(f, "all"),
            Self::LastYears(n) => write!(f, "last:{n}"),
        }
    }
}
