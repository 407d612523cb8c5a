//! Absence record model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::MonthBucket;

/// Aggregated absence for one employee in one calendar month.
///
/// Several records may exist for the same employee and month when the
/// absence types differ; every record contributes to the monthly total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceRecord {
    /// The employee the absence was recorded for.
    pub employee_id: String,
    /// A date inside the month the absence belongs to (normally its first day).
    pub month: NaiveDate,
    /// Number of days absent.
    pub absent_days: u32,
    /// Category of absence (e.g., "Maladie", "Congé").
    pub absence_type: String,
}

impl AbsenceRecord {
    /// Returns true if the record's month falls inside the bucket.
    pub fn falls_in(&self, bucket: &MonthBucket) -> bool {
        bucket.contains_date(self.month)
    }

    /// Identifying key used in error messages and logs.
    pub fn key(&self) -> String {
        format!("{}@{}/{}", self.employee_id, self.month, self.absence_type)
    }
}
