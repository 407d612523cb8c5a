//! Monthly KPI aggregation.
//!
//! This module combines the headcount, absenteeism and recruiting
//! calculations into one metrics row per month bucket, and runs them over
//! every bucket of the record store.

use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::KpiSettings;
use crate::error::EngineResult;
use crate::models::{
    AggregationReport, AuditStep, AuditTrace, AuditWarning, MonthBucket, MonthlyMetrics,
};
use crate::records::RecordStore;

use super::absenteeism::calculate_absenteeism;
use super::bucketizer::month_buckets;
use super::headcount::count_headcount;
use super::recruiting::calculate_recruiting;

/// Audit steps recorded per bucket: headcount, absenteeism, recruiting.
pub const STEPS_PER_BUCKET: u32 = 3;

/// The metrics row for one bucket together with its audit steps.
#[derive(Debug, Clone)]
pub struct MonthlyMetricsResult {
    /// The computed row.
    pub metrics: MonthlyMetrics,
    /// Audit steps in order: headcount, absenteeism, recruiting.
    pub audit_steps: Vec<AuditStep>,
}

/// Computes the metrics row for a single bucket.
///
/// The computation depends only on the bucket and the immutable record
/// store; buckets can be computed in any order.
///
/// # Arguments
///
/// * `bucket` - The month to compute
/// * `store` - The validated record sets
/// * `settings` - KPI constants
/// * `start_step_number` - The starting step number for audit trail sequencing
pub fn compute_monthly_metrics(
    bucket: &MonthBucket,
    store: &RecordStore,
    settings: &KpiSettings,
    start_step_number: u32,
) -> MonthlyMetricsResult {
    let headcount = count_headcount(store.employees(), bucket, start_step_number);
    let absenteeism = calculate_absenteeism(
        store.absences(),
        bucket,
        headcount.active_count,
        settings,
        start_step_number + 1,
    );
    let recruiting =
        calculate_recruiting(store.recruiting(), bucket, settings, start_step_number + 2);

    let metrics = MonthlyMetrics {
        month: bucket.start_date,
        active_count: headcount.active_count,
        hires: headcount.hires,
        leaves: headcount.leaves,
        turnover: headcount.turnover,
        total_absent_days: absenteeism.total_absent_days,
        absenteeism_rate: absenteeism.absenteeism_rate,
        recruit_hires: recruiting.recruit_hires,
        time_to_hire: recruiting.time_to_hire,
        cost_per_hire: recruiting.cost_per_hire,
    };

    debug!(
        month = %bucket,
        active_count = metrics.active_count,
        hires = metrics.hires,
        leaves = metrics.leaves,
        total_absent_days = metrics.total_absent_days,
        recruit_hires = metrics.recruit_hires,
        "Computed monthly metrics"
    );

    MonthlyMetricsResult {
        metrics,
        audit_steps: vec![
            headcount.audit_step,
            absenteeism.audit_step,
            recruiting.audit_step,
        ],
    }
}

/// Aggregates the whole record store into one metrics row per month.
///
/// # Returns
///
/// Returns an [`AggregationReport`] with rows sorted ascending by month, or
/// an error if the buckets cannot be derived (e.g., `EmptyInput` when the
/// store has no employees). No partial report is ever returned.
pub fn aggregate_metrics(
    store: &RecordStore,
    settings: &KpiSettings,
) -> EngineResult<AggregationReport> {
    let start = Instant::now();
    let run_id = Uuid::new_v4();

    let buckets = month_buckets(store.employees(), store.absences())?;

    let (rows, steps): (Vec<MonthlyMetrics>, Vec<Vec<AuditStep>>) = buckets
        .iter()
        .zip((1u32..).step_by(STEPS_PER_BUCKET as usize))
        .map(|(bucket, step)| {
            let result = compute_monthly_metrics(bucket, store, settings, step);
            (result.metrics, result.audit_steps)
        })
        .unzip();

    let warnings = aggregation_warnings(store);
    for warning in &warnings {
        warn!(code = %warning.code, "{}", warning.message);
    }

    let duration_us = start.elapsed().as_micros() as u64;

    info!(
        run_id = %run_id,
        months = rows.len(),
        warnings = warnings.len(),
        duration_us,
        "Aggregated monthly metrics"
    );

    Ok(AggregationReport {
        run_id,
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        rows,
        audit_trace: AuditTrace {
            steps: steps.into_iter().flatten().collect(),
            warnings,
            duration_us,
        },
    })
}

/// Data-quality warnings for a record store.
///
/// These depend only on the records, not on the computed rows.
pub fn aggregation_warnings(store: &RecordStore) -> Vec<AuditWarning> {
    let mut warnings = Vec::new();

    let mut orphans = 0;
    for absence in store.orphan_absences() {
        debug!(absence = %absence.key(), "Absence references unknown employee");
        orphans += 1;
    }
    if orphans > 0 {
        warnings.push(AuditWarning {
            code: "ORPHAN_ABSENCES".to_string(),
            message: format!(
                "{} absence records reference unknown employees; they are still counted in absent days",
                orphans
            ),
            severity: "medium".to_string(),
        });
    }

    let open = store.recruiting().iter().filter(|e| !e.is_closed()).count();
    if open > 0 {
        warnings.push(AuditWarning {
            code: "OPEN_REQUISITIONS".to_string(),
            message: format!(
                "{} requisitions are still open and excluded from recruiting metrics",
                open
            ),
            severity: "low".to_string(),
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::models::{AbsenceRecord, Employee, RecruitingEvent};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn employee(id: &str, hire: NaiveDate, leave: Option<NaiveDate>) -> Employee {
        Employee {
            id: id.to_string(),
            first_name: "Léa".to_string(),
            last_name: "Moreau".to_string(),
            gender: "F".to_string(),
            date_of_birth: date(1992, 3, 8),
            department: "RH".to_string(),
            site: "Paris".to_string(),
            contract: "CDI".to_string(),
            salary: Decimal::new(3100, 0),
            hire_date: hire,
            leave_date: leave,
        }
    }

    fn single_employee_store() -> RecordStore {
        RecordStore::new(
            vec![employee("1", date(2024, 1, 10), Some(date(2024, 3, 20)))],
            vec![AbsenceRecord {
                employee_id: "1".to_string(),
                month: date(2024, 2, 1),
                absent_days: 2,
                absence_type: "Maladie".to_string(),
            }],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_empty_store_fails_with_empty_input() {
        let store = RecordStore::new(vec![], vec![], vec![]).unwrap();
        let result = aggregate_metrics(&store, &KpiSettings::default());
        assert!(matches!(result, Err(EngineError::EmptyInput { .. })));
    }

    #[test]
    fn test_single_employee_hire_absence_leave() {
        let store = RecordStore::new(
            vec![employee("1", date(2024, 1, 10), Some(date(2024, 3, 20)))],
            vec![
                AbsenceRecord {
                    employee_id: "1".to_string(),
                    month: date(2024, 2, 1),
                    absent_days: 2,
                    absence_type: "Maladie".to_string(),
                },
                AbsenceRecord {
                    employee_id: "1".to_string(),
                    month: date(2024, 3, 1),
                    absent_days: 0,
                    absence_type: "Autre".to_string(),
                },
            ],
            vec![],
        )
        .unwrap();

        let report = aggregate_metrics(&store, &KpiSettings::default()).unwrap();
        assert_eq!(report.rows.len(), 3);

        let january = &report.rows[0];
        assert_eq!(january.month, date(2024, 1, 1));
        assert_eq!(january.active_count, 1);
        assert_eq!(january.hires, 1);
        assert_eq!(january.leaves, 0);
        assert_eq!(january.turnover, Decimal::ZERO);

        let february = &report.rows[1];
        assert_eq!(february.active_count, 1);
        assert_eq!(february.total_absent_days, 2);
        assert_eq!(
            february.absenteeism_rate,
            Decimal::from(2) / Decimal::from(21)
        );

        let march = &report.rows[2];
        assert_eq!(march.active_count, 1);
        assert_eq!(march.leaves, 1);
        assert_eq!(march.turnover, Decimal::ONE);

        for row in &report.rows {
            assert_eq!(row.recruit_hires, 0);
            assert_eq!(row.time_to_hire, None);
            assert_eq!(row.cost_per_hire, None);
        }
    }

    #[test]
    fn test_compute_monthly_metrics_returns_three_ordered_steps() {
        let store = single_employee_store();
        let bucket = MonthBucket::containing(date(2024, 2, 1)).unwrap();

        let result = compute_monthly_metrics(&bucket, &store, &KpiSettings::default(), 4);

        let ids: Vec<&str> = result
            .audit_steps
            .iter()
            .map(|s| s.rule_id.as_str())
            .collect();
        assert_eq!(
            ids,
            vec!["headcount_turnover", "absenteeism_rate", "recruiting_funnel"]
        );
        let numbers: Vec<u32> = result.audit_steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![4, 5, 6]);
    }

    #[test]
    fn test_audit_trace_step_numbers_are_sequential() {
        let store = single_employee_store();

        let report = aggregate_metrics(&store, &KpiSettings::default()).unwrap();

        assert_eq!(
            report.audit_trace.steps.len(),
            report.rows.len() * STEPS_PER_BUCKET as usize
        );
        for (index, step) in report.audit_trace.steps.iter().enumerate() {
            assert_eq!(step.step_number, index as u32 + 1);
        }
    }

    #[test]
    fn test_rows_sorted_ascending_by_month() {
        let store = RecordStore::new(
            vec![
                employee("2", date(2024, 4, 2), None),
                employee("1", date(2023, 11, 5), None),
            ],
            vec![],
            vec![],
        )
        .unwrap();

        let report = aggregate_metrics(&store, &KpiSettings::default()).unwrap();

        let months: Vec<NaiveDate> = report.rows.iter().map(|r| r.month).collect();
        let mut sorted = months.clone();
        sorted.sort();
        assert_eq!(months, sorted);
        assert_eq!(months.first(), Some(&date(2023, 11, 1)));
        assert_eq!(months.last(), Some(&date(2024, 4, 1)));
    }

    #[test]
    fn test_warnings_for_orphans_and_open_requisitions() {
        let store = RecordStore::new(
            vec![employee("1", date(2024, 1, 10), None)],
            vec![AbsenceRecord {
                employee_id: "404".to_string(),
                month: date(2024, 1, 1),
                absent_days: 1,
                absence_type: "Autre".to_string(),
            }],
            vec![RecruitingEvent {
                requisition_id: "r1".to_string(),
                open_date: date(2024, 1, 3),
                close_date: None,
                status: "Open".to_string(),
                offers_made: 0,
                offers_accepted: 0,
                time_to_hire: None,
                cost: Decimal::ZERO,
            }],
        )
        .unwrap();

        let report = aggregate_metrics(&store, &KpiSettings::default()).unwrap();

        let codes: Vec<&str> = report
            .audit_trace
            .warnings
            .iter()
            .map(|w| w.code.as_str())
            .collect();
        assert_eq!(codes, vec!["ORPHAN_ABSENCES", "OPEN_REQUISITIONS"]);
        // orphan absence days still count
        assert_eq!(report.rows[0].total_absent_days, 1);
    }
}
