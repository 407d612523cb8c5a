//! Core data models for the HR KPI engine.
//!
//! This module contains the record types read from the HR record store,
//! the month bucket, and the monthly metrics output.

mod absence;
mod employee;
mod month_bucket;
mod monthly_metrics;
mod recruiting;

pub use absence::AbsenceRecord;
pub use employee::Employee;
pub use month_bucket::{MonthBucket, floor_to_month};
pub use monthly_metrics::{
    AggregationReport, AuditStep, AuditTrace, AuditWarning, MonthlyMetrics,
};
pub use recruiting::{DEFAULT_HIRED_STATUS, RecruitingEvent};
