//! Period codes and the chronological sort key derived from them.
//!
//! Codes follow the statistical-agency convention: `M01`..`M12` monthly,
//! `M13` annual average, `Q01`..`Q04` quarterly, `S01`/`S02` semiannual,
//! `A01` annual. Sort keys:
//!
//! | periodicity | sort key              |
//! |-------------|-----------------------|
//! | monthly     | `year * 100 + month`  |
//! | `M13`       | `year * 100 + 13`     |
//! | quarterly   | `year * 10 + quarter` |
//! | semiannual  | `year * 10 + half`    |
//! | annual      | `year`                |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    #[error("unrecognised period code '{0}'")]
    Unrecognised(String),

    #[error("period ordinal out of range in '{0}'")]
    OutOfRange(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Periodicity {
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
}

/// A parsed period code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PeriodCode {
    /// Calendar month, 1..=12.
    Month(u8),
    /// `M13`: the annual average published alongside monthly data.
    AnnualAverage,
    /// Quarter, 1..=4.
    Quarter(u8),
    /// Half-year, 1..=2.
    Half(u8),
    /// Annual observation; the ordinal is kept so the code displays as received.
    Annual(u8),
}

impl PeriodCode {
    pub fn parse(code: &str) -> Result<Self, PeriodError> {
        let code = code.trim();
        let mut chars = code.chars();
        let prefix = chars
            .next()
            .ok_or_else(|| PeriodError::Unrecognised(code.to_string()))?;
        let ordinal: u8 = chars
            .as_str()
            .parse()
            .map_err(|_| PeriodError::Unrecognised(code.to_string()))?;

        let out_of_range = || PeriodError::OutOfRange(code.to_string());
        match prefix.to_ascii_uppercase() {
            'M' => match ordinal {
                1..=12 => Ok(Self::Month(ordinal)),
                13 => Ok(Self::AnnualAverage),
                _ => Err(out_of_range()),
            },
            'Q' if (1..=4).contains(&ordinal) => Ok(Self::Quarter(ordinal)),
            'S' if (1..=2).contains(&ordinal) => Ok(Self::Half(ordinal)),
            'A' if ordinal >= 1 => Ok(Self::Annual(ordinal)),
            'Q' | 'S' | 'A' => Err(out_of_range()),
            _ => Err(PeriodError::Unrecognised(code.to_string())),
        }
    }

    pub fn periodicity(&self) -> Periodicity {
        match self {
            Self::Month(_) => Periodicity::Monthly,
            Self::Quarter(_) => Periodicity::Quarterly,
            Self::Half(_) => Periodicity::Semiannual,
            Self::AnnualAverage | Self::Annual(_) => Periodicity::Annual,
        }
    }

    /// Chronological key for a point in `year` carrying this code.
    pub fn sort_key(&self, year: i32) -> i64 {
        let year = i64::from(year);
        match *self {
            Self::Month(m) => year * 100 + i64::from(m),
            Self::AnnualAverage => year * 100 + 13,
            Self::Quarter(q) => year * 10 + i64::from(q),
            Self::Half(h) => year * 10 + i64::from(h),
            Self::Annual(_) => year,
        }
    }
}

impl FromStr for PeriodCode {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PeriodCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Month(m) => write!(f, "M{m:02}"),
            Self::AnnualAverage => write!(f, "M13"),
            Self::Quarter(q) => write!(f, "Q{q:02}"),
            Self::Half(h) => write!(f, "S{h:02}"),
            Self::Annual(a) => write!(f, "A{a:02}"),
        }
    }
}

/// Row identity in an aligned timeline: `year:periodCode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodKey {
    pub year: i32,
    pub code: PeriodCode,
}

impl PeriodKey {
    pub fn new(year: i32, code: PeriodCode) -> Self {
        Self { year, code }
    }

    pub fn sort_key(&self) -> i64 {
        self.code.sort_key(self.year)
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.year, self.code)
    }
}

impl Serialize for PeriodKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
