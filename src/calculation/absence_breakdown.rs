//! Absence breakdowns for the dashboard.
//!
//! Two read-only views over the absence record set: record counts per month
//! and absence type, and mean absent days per department (absences joined
//! to employees on employee id).

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{AbsenceRecord, Employee, floor_to_month};

/// Number of absence records for one month and absence type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceTypeCount {
    /// First day of the month.
    pub month: NaiveDate,
    /// The absence type.
    pub absence_type: String,
    /// Number of absence records.
    pub count: usize,
}

/// Mean absent days per absence record for one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentAbsence {
    /// The department name.
    pub department: String,
    /// Mean `absent_days` over the department's absence records.
    pub mean_absent_days: Decimal,
    /// Number of absence records joined to the department.
    pub records: usize,
}

/// Counts absence records per (month, absence type).
///
/// Rows are sorted by month, then absence type.
pub fn absences_by_type(absences: &[AbsenceRecord]) -> Vec<AbsenceTypeCount> {
    absences
        .iter()
        .fold(BTreeMap::new(), |mut groups, absence| {
            *groups
                .entry((floor_to_month(absence.month), absence.absence_type.as_str()))
                .or_insert(0usize) += 1;
            groups
        })
        .into_iter()
        .map(|((month, absence_type), count)| AbsenceTypeCount {
            month,
            absence_type: absence_type.to_string(),
            count,
        })
        .collect()
}

/// Mean absent days per department.
///
/// Absences are inner-joined to employees: records whose employee id is
/// unknown are dropped. Rows are sorted by department.
pub fn mean_absence_by_department(
    absences: &[AbsenceRecord],
    employees: &[Employee],
) -> Vec<DepartmentAbsence> {
    let departments: HashMap<&str, &str> = employees
        .iter()
        .map(|e| (e.id.as_str(), e.department.as_str()))
        .collect();

    let joined: Vec<(&str, u32)> = absences
        .iter()
        .filter_map(|absence| {
            departments
                .get(absence.employee_id.as_str())
                .map(|department| (*department, absence.absent_days))
        })
        .collect();

    let dropped = absences.len() - joined.len();
    if dropped > 0 {
        warn!(dropped, "Absences without a matching employee left out of department view");
    }

    joined
        .into_iter()
        .fold(BTreeMap::new(), |mut groups, (department, days)| {
            let (records, total) = groups.entry(department).or_insert((0usize, 0u64));
            *records += 1;
            *total += u64::from(days);
            groups
        })
        .into_iter()
        .map(|(department, (records, total))| DepartmentAbsence {
            department: department.to_string(),
            mean_absent_days: Decimal::from(total) / Decimal::from(records),
            records,
        })
        .collect()
}
