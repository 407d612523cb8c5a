//! Month bucket model.
//!
//! This module contains the [`MonthBucket`] type, the calendar-month interval
//! every KPI is aggregated over.

use std::fmt;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A calendar month treated as a closed date interval.
///
/// Both `start_date` (the first day of the month) and `end_date` (the last
/// day of the month) are inclusive. A bucket is identified by its first day.
///
/// # Example
///
/// ```
/// use hr_kpi_engine::models::MonthBucket;
/// use chrono::NaiveDate;
///
/// let february = MonthBucket::containing(NaiveDate::from_ymd_opt(2024, 2, 14).unwrap()).unwrap();
///
/// assert_eq!(february.start_date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
/// assert_eq!(february.end_date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
/// assert_eq!(february.to_string(), "2024-02");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthBucket {
    /// The first day of the month (inclusive).
    pub start_date: NaiveDate,
    /// The last day of the month (inclusive).
    pub end_date: NaiveDate,
}

impl MonthBucket {
    /// Returns the bucket for the calendar month containing `date`.
    ///
    /// # Errors
    ///
    /// Returns `CalculationError` if the end of the month is outside the
    /// representable date range.
    pub fn containing(date: NaiveDate) -> EngineResult<Self> {
        let start_date = floor_to_month(date);
        let end_date = start_date
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("month containing {} is out of range", date),
            })?;

        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// Returns the bucket for the following calendar month.
    pub fn next(&self) -> EngineResult<Self> {
        let next_start = self
            .end_date
            .succ_opt()
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("no month follows {}", self),
            })?;
        Self::containing(next_start)
    }

    /// Checks if a date falls within this bucket, inclusive of both ends.
    ///
    /// # Example
    ///
    /// ```
    /// use hr_kpi_engine::models::MonthBucket;
    /// use chrono::NaiveDate;
    ///
    /// let march = MonthBucket::containing(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()).unwrap();
    ///
    /// assert!(march.contains_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
    /// assert!(march.contains_date(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()));
    /// assert!(!march.contains_date(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
    /// ```
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

impl fmt::Display for MonthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start_date.format("%Y-%m"))
    }
}

/// Returns the first day of the calendar month containing `date`.
pub fn floor_to_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}
