//! Monthly bucketizer.
//!
//! This module derives the ordered, gap-free sequence of calendar months the
//! KPI aggregation runs over.

use std::iter::successors;

use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{AbsenceRecord, Employee, MonthBucket, floor_to_month};

/// Produces every calendar month from the earliest hire to the latest event.
///
/// The first bucket is the month of the earliest `hire_date`. The last bucket
/// is the month of the latest absence record, or of the latest `hire_date`
/// when there are no absences. Every month in between appears exactly once,
/// in ascending order.
///
/// # Errors
///
/// - `EmptyInput` if `employees` is empty
/// - `CalculationError` if a month falls outside the representable range
///
/// # Examples
///
/// ```
/// use hr_kpi_engine::calculation::month_buckets;
/// use hr_kpi_engine::models::{AbsenceRecord, Employee};
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
///     leave_date: None,
/// };
/// let absence = AbsenceRecord {
///     employee_id: "1".to_string(),
///     month: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
///     absent_days: 1,
///     absence_type: "Maladie".to_string(),
/// };
///
/// let buckets = month_buckets(&[employee], &[absence]).unwrap();
/// let labels: Vec<String> = buckets.iter().map(|b| b.to_string()).collect();
/// assert_eq!(labels, vec!["2024-01", "2024-02", "2024-03"]);
/// ```
pub fn month_buckets(
    employees: &[Employee],
    absences: &[AbsenceRecord],
) -> EngineResult<Vec<MonthBucket>> {
    let earliest_hire = employees
        .iter()
        .map(|e| e.hire_date)
        .min()
        .ok_or_else(|| EngineError::EmptyInput {
            record_set: "employee".to_string(),
        })?;

    let latest_event = match absences.iter().map(|a| a.month).max() {
        Some(latest_absence) => latest_absence,
        None => employees
            .iter()
            .map(|e| e.hire_date)
            .max()
            .unwrap_or(earliest_hire),
    };

    let first_month = floor_to_month(earliest_hire);
    let mut last_month = floor_to_month(latest_event);
    if last_month < first_month {
        warn!(
            first_month = %first_month,
            latest_absence = %latest_event,
            "All absences predate the earliest hire; emitting a single bucket"
        );
        last_month = first_month;
    }

    let first = MonthBucket::containing(first_month)?;
    let buckets = successors(Some(Ok(first)), |previous: &EngineResult<MonthBucket>| {
        match previous {
            Ok(bucket) if bucket.start_date < last_month => Some(bucket.next()),
            _ => None,
        }
    })
    .collect::<EngineResult<Vec<MonthBucket>>>()?;

    debug!(
        first = %first_month,
        last = %last_month,
        buckets = buckets.len(),
        "Derived month buckets"
    );

    Ok(buckets)
}
