//! Absenteeism calculation.
//!
//! Absent person-days are compared against an assumed number of working
//! person-days: a fixed number of working days per active employee, not a
//! real calendar.

use rust_decimal::Decimal;

use crate::config::KpiSettings;
use crate::models::{AbsenceRecord, AuditStep, MonthBucket};

use super::headcount::ratio_or_zero;

/// The result of the absenteeism calculation for one bucket.
#[derive(Debug, Clone)]
pub struct AbsenteeismResult {
    /// Sum of absent days over every record in the bucket.
    pub total_absent_days: u64,
    /// Assumed working person-days in the bucket.
    pub working_days: u64,
    /// `total_absent_days / working_days`, or zero without working days.
    pub absenteeism_rate: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates absenteeism for a bucket.
///
/// All absence records whose month falls in the bucket are summed,
/// regardless of employee or absence type; several records for the same
/// employee and month all count.
///
/// # Arguments
///
/// * `absences` - The full absence record set
/// * `bucket` - The month to calculate
/// * `active_count` - Active headcount for the bucket
/// * `settings` - KPI constants (working days per employee)
/// * `step_number` - The step number for audit trail sequencing
pub fn calculate_absenteeism(
    absences: &[AbsenceRecord],
    bucket: &MonthBucket,
    active_count: usize,
    settings: &KpiSettings,
    step_number: u32,
) -> AbsenteeismResult {
    let in_bucket = absences.iter().filter(|a| a.falls_in(bucket));
    let (records, total_absent_days) = in_bucket.fold((0usize, 0u64), |(n, sum), a| {
        (n + 1, sum + u64::from(a.absent_days))
    });

    let working_days = u64::from(settings.working_days_per_employee) * active_count as u64;
    let absenteeism_rate =
        ratio_or_zero(Decimal::from(total_absent_days), Decimal::from(working_days));

    let audit_step = AuditStep {
        step_number,
        rule_id: "absenteeism_rate".to_string(),
        rule_name: "Absenteeism Rate".to_string(),
        month: bucket.start_date,
        input: serde_json::json!({
            "absence_records": records,
            "active_count": active_count,
            "working_days_per_employee": settings.working_days_per_employee
        }),
        output: serde_json::json!({
            "total_absent_days": total_absent_days,
            "working_days": working_days,
            "absenteeism_rate": absenteeism_rate.normalize().to_string()
        }),
        reasoning: if working_days == 0 {
            format!("No working days in {}; absenteeism rate set to 0", bucket)
        } else {
            format!(
                "{} absent days / ({} days x {} active) = {}",
                total_absent_days,
                settings.working_days_per_employee,
                active_count,
                absenteeism_rate.normalize()
            )
        },
    };

    AbsenteeismResult {
        total_absent_days,
        working_days,
        absenteeism_rate,
        audit_step,
    }
}
