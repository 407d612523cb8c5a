//! Monthly metrics models.
//!
//! This module contains the [`MonthlyMetrics`] row written to the metrics
//! table, and the [`AggregationReport`] that wraps a full run together with
//! its audit trace.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of the monthly metrics table.
///
/// Field order matches the column order of the output file. Undefined
/// values (`time_to_hire`, `cost_per_hire`) are `None`, which is distinct
/// from zero.
///
/// # Example
///
/// ```
/// use hr_kpi_engine::models::MonthlyMetrics;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let row = MonthlyMetrics {
///     month: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     active_count: 1,
///     hires: 1,
///     leaves: 0,
///     turnover: Decimal::ZERO,
///     total_absent_days: 0,
///     absenteeism_rate: Decimal::ZERO,
///     recruit_hires: 0,
///     time_to_hire: None,
///     cost_per_hire: None,
/// };
/// assert!(row.cost_per_hire.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyMetrics {
    /// First day of the month this row describes.
    pub month: NaiveDate,
    /// Employees whose employment interval overlaps the month.
    pub active_count: usize,
    /// Employees hired during the month.
    pub hires: usize,
    /// Employees who left during the month.
    pub leaves: usize,
    /// `leaves / active_count`, or zero when nobody was active.
    pub turnover: Decimal,
    /// Sum of absent days recorded for the month.
    pub total_absent_days: u64,
    /// `total_absent_days / working_days`, or zero when there were no working days.
    pub absenteeism_rate: Decimal,
    /// Requisitions closed during the month with the hired status.
    pub recruit_hires: usize,
    /// Mean days-to-close over requisitions closed during the month.
    pub time_to_hire: Option<Decimal>,
    /// Recruiting spend of the month divided by `recruit_hires`.
    pub cost_per_hire: Option<Decimal>,
}

/// A single step in the audit trace recording how a metric group was derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number within the run.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The month the step applies to.
    pub month: NaiveDate,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the derivation.
    pub reasoning: String,
}

/// A warning generated during aggregation.
///
/// Warnings flag suspicious input that does not invalidate the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for an aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of derivation steps, in bucket order.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during aggregation.
    pub warnings: Vec<AuditWarning>,
    /// The total aggregation duration in microseconds.
    pub duration_us: u64,
}

/// The result of a full aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationReport {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// The version of the engine that produced the report.
    pub engine_version: String,
    /// One row per month, ascending.
    pub rows: Vec<MonthlyMetrics>,
    /// Complete audit trace of the run.
    pub audit_trace: AuditTrace,
}

impl AggregationReport {
    /// Returns the most recent month's row, if any.
    pub fn latest(&self) -> Option<&MonthlyMetrics> {
        self.rows.last()
    }

    /// Returns the row for the month starting on `month`.
    pub fn row_for(&self, month: NaiveDate) -> Option<&MonthlyMetrics> {
        self.rows
            .binary_search_by(|row| row.month.cmp(&month))
            .ok()
            .map(|index| &self.rows[index])
    }
}
