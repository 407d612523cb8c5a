//! Employee model.
//!
//! This module defines the [`Employee`] record and the employment-interval
//! predicates the KPI aggregation and churn features are built on.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::MonthBucket;

/// Represents an employee as supplied by the HR record store.
///
/// The employment interval runs from `hire_date` to `leave_date` inclusive.
/// A missing `leave_date` means the employee was still employed when the
/// data snapshot was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Gender code as recorded by HR (e.g., "F", "M").
    pub gender: String,
    /// The employee's date of birth.
    pub date_of_birth: NaiveDate,
    /// The department the employee belongs to.
    pub department: String,
    /// The site the employee works at.
    pub site: String,
    /// The contract type (e.g., "CDI", "CDD").
    pub contract: String,
    /// Monthly gross salary.
    pub salary: Decimal,
    /// The first day of employment.
    pub hire_date: NaiveDate,
    /// The last day of employment, if the employee has left.
    pub leave_date: Option<NaiveDate>,
}

impl Employee {
    /// Checks the record's invariants.
    ///
    /// # Errors
    ///
    /// Returns `DataIntegrity` if `leave_date` is before `hire_date`.
    pub fn validate(&self) -> EngineResult<()> {
        if let Some(leave_date) = self.leave_date.filter(|d| *d < self.hire_date) {
            return Err(EngineError::integrity(
                "employee",
                &self.id,
                format!(
                    "leave_date {} is before hire_date {}",
                    leave_date, self.hire_date
                ),
            ));
        }
        Ok(())
    }

    /// Returns true if the employment interval overlaps the bucket.
    ///
    /// An employee hired and terminated within the same month counts as
    /// active for that month.
    ///
    /// # Example
    ///
    /// ```
    /// use hr_kpi_engine::models::{Employee, MonthBucket};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee {
    ///     id: "1".to_string(),
    ///     first_name: "Camille".to_string(),
    ///     last_name: "Martin".to_string(),
    ///     gender: "F".to_string(),
    ///     date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 2).unwrap(),
    ///     department: "IT".to_string(),
    ///     site: "Lyon".to_string(),
    ///     contract: "CDI".to_string(),
    ///     salary: Decimal::new(3200, 0),
    ///     hire_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
    ///     leave_date: Some(NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()),
    /// };
    ///
    /// let march = MonthBucket::containing(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()).unwrap();
    /// let april = MonthBucket::containing(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()).unwrap();
    /// assert!(employee.is_active_during(&march));
    /// assert!(!employee.is_active_during(&april));
    /// ```
    pub fn is_active_during(&self, bucket: &MonthBucket) -> bool {
        self.hire_date <= bucket.end_date
            && self
                .leave_date
                .is_none_or(|leave_date| leave_date >= bucket.start_date)
    }

    /// Returns true if the employee was hired inside the bucket.
    pub fn was_hired_during(&self, bucket: &MonthBucket) -> bool {
        bucket.contains_date(self.hire_date)
    }

    /// Returns true if the employee left inside the bucket.
    pub fn left_during(&self, bucket: &MonthBucket) -> bool {
        self.leave_date
            .is_some_and(|leave_date| bucket.contains_date(leave_date))
    }

    /// Returns true if the employee is on the payroll on the given date.
    pub fn is_employed_on(&self, date: NaiveDate) -> bool {
        self.hire_date <= date && self.leave_date.is_none_or(|leave_date| leave_date >= date)
    }

    /// Returns true if the employee has a recorded departure.
    pub fn has_left(&self) -> bool {
        self.leave_date.is_some()
    }
}
