//! # Date Ranges
//!
//! Some quarterly obligations identify their periods by explicit date
//! ranges rather than by quarter number. [`DateRange`] is the validated
//! representation; quarter arithmetic lives here so the configurator and
//! the reconciler agree on which quarter a range belongs to.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// An inclusive date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting an end before the start.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvertedDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Calendar bounds of `quarter` (1–4) in `year`.
    ///
    /// Returns `None` for a quarter number outside 1–4.
    pub fn quarter_bounds(year: i32, quarter: u8) -> Option<Self> {
        if !(1..=4).contains(&quarter) {
            return None;
        }
        let first_month = u32::from(quarter - 1) * 3 + 1;
        let start = NaiveDate::from_ymd_opt(year, first_month, 1)?;
        let end = if quarter == 4 {
            NaiveDate::from_ymd_opt(year, 12, 31)?
        } else {
            NaiveDate::from_ymd_opt(year, first_month + 3, 1)?.pred_opt()?
        };
        Some(Self { start, end })
    }

    /// First day of the range.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the range.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` falls within the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether the range starts in `quarter` of `year`, the quarter it is
    /// keyed by.
    pub fn starts_in_quarter(&self, year: i32, quarter: u8) -> bool {
        self.start.year() == year && quarter_of(self.start) == quarter
    }
}

/// Calendar quarter (1–4) of a date.
pub fn quarter_of(date: NaiveDate) -> u8 {
    // month0 is 0..=11, so the quotient is 0..=3.
    (date.month0() / 3) as u8 + 1
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = ValidationError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::new(raw.start, raw.end)
    }
}
