//! Headcount and turnover calculation.
//!
//! This module counts active employees, hires and leaves for a month bucket
//! and derives the monthly turnover ratio.

use rust_decimal::Decimal;

use crate::models::{AuditStep, Employee, MonthBucket};

/// The result of the headcount calculation for one bucket.
#[derive(Debug, Clone)]
pub struct HeadcountResult {
    /// Employees whose employment interval overlaps the bucket.
    pub active_count: usize,
    /// Employees hired during the bucket.
    pub hires: usize,
    /// Employees who left during the bucket.
    pub leaves: usize,
    /// `leaves / active_count`, or zero when nobody was active.
    pub turnover: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Returns `numerator / denominator`, or zero when the denominator is zero.
pub(crate) fn ratio_or_zero(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// Counts headcount, hires and leaves for a bucket.
///
/// An employee is active when `hire_date <= end_date` and the employee has
/// either not left or left on or after `start_date`. An employee leaving
/// inside the bucket is therefore counted both as active and as a leave.
///
/// # Arguments
///
/// * `employees` - The full employee record set
/// * `bucket` - The month to count
/// * `step_number` - The step number for audit trail sequencing
pub fn count_headcount(
    employees: &[Employee],
    bucket: &MonthBucket,
    step_number: u32,
) -> HeadcountResult {
    let active_count = employees
        .iter()
        .filter(|e| e.is_active_during(bucket))
        .count();
    let hires = employees
        .iter()
        .filter(|e| e.was_hired_during(bucket))
        .count();
    let leaves = employees.iter().filter(|e| e.left_during(bucket)).count();

    let turnover = ratio_or_zero(Decimal::from(leaves), Decimal::from(active_count));

    let audit_step = AuditStep {
        step_number,
        rule_id: "headcount_turnover".to_string(),
        rule_name: "Headcount and Turnover".to_string(),
        month: bucket.start_date,
        input: serde_json::json!({
            "bucket_start": bucket.start_date.to_string(),
            "bucket_end": bucket.end_date.to_string(),
            "employees": employees.len()
        }),
        output: serde_json::json!({
            "active_count": active_count,
            "hires": hires,
            "leaves": leaves,
            "turnover": turnover.normalize().to_string()
        }),
        reasoning: if active_count == 0 {
            format!("No active employees in {}; turnover set to 0", bucket)
        } else {
            format!(
                "{} leaves / {} active employees = {} turnover in {}",
                leaves,
                active_count,
                turnover.normalize(),
                bucket
            )
        },
    };

    HeadcountResult {
        active_count,
        hires,
        leaves,
        turnover,
        audit_step,
    }
}
