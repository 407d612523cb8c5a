//! Calculation logic for the HR KPI engine.
//!
//! This module contains the monthly bucketizer, the per-domain KPI
//! calculations (headcount and turnover, absenteeism, recruiting funnel and
//! cost), the aggregator that combines them into one metrics row per month,
//! and the absence breakdowns served to the dashboard.

mod absence_breakdown;
mod absenteeism;
mod aggregator;
mod bucketizer;
mod headcount;
mod recruiting;

pub use absence_breakdown::{
    AbsenceTypeCount, DepartmentAbsence, absences_by_type, mean_absence_by_department,
};
pub use absenteeism::{AbsenteeismResult, calculate_absenteeism};
pub use aggregator::{
    MonthlyMetricsResult, STEPS_PER_BUCKET, aggregate_metrics, aggregation_warnings,
    compute_monthly_metrics,
};
pub use bucketizer::month_buckets;
pub use headcount::{HeadcountResult, count_headcount};
pub use recruiting::{RecruitingResult, calculate_recruiting};
