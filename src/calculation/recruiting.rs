//! Recruiting funnel and cost calculation.
//!
//! A requisition contributes to the bucket containing its `close_date`.
//! Open requisitions contribute to nothing. Time-to-hire and cost-per-hire
//! stay undefined when there is nothing to average or divide by; they are
//! never reported as zero.

use rust_decimal::Decimal;

use crate::config::KpiSettings;
use crate::models::{AuditStep, MonthBucket, RecruitingEvent};

/// The result of the recruiting calculation for one bucket.
#[derive(Debug, Clone)]
pub struct RecruitingResult {
    /// Requisitions closed in the bucket with the hired status.
    pub recruit_hires: usize,
    /// Requisitions closed in the bucket, any status.
    pub closed_requisitions: usize,
    /// Mean days-to-close over closed requisitions; `None` when none closed.
    pub time_to_hire: Option<Decimal>,
    /// Total cost of closed requisitions.
    pub total_cost: Decimal,
    /// `total_cost / recruit_hires`; `None` when nobody was hired.
    pub cost_per_hire: Option<Decimal>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates recruiting metrics for a bucket.
///
/// # Arguments
///
/// * `events` - The full recruiting record set
/// * `bucket` - The month to calculate
/// * `settings` - KPI constants (which status counts as a hire)
/// * `step_number` - The step number for audit trail sequencing
pub fn calculate_recruiting(
    events: &[RecruitingEvent],
    bucket: &MonthBucket,
    settings: &KpiSettings,
    step_number: u32,
) -> RecruitingResult {
    let closed: Vec<&RecruitingEvent> =
        events.iter().filter(|e| e.closed_during(bucket)).collect();

    let recruit_hires = closed
        .iter()
        .filter(|e| e.is_hire(&settings.hired_status))
        .count();

    let durations: Vec<i64> = closed.iter().filter_map(|e| e.days_to_close()).collect();
    let time_to_hire = if durations.is_empty() {
        None
    } else {
        let total: i64 = durations.iter().sum();
        Some(Decimal::from(total) / Decimal::from(durations.len()))
    };

    let total_cost: Decimal = closed.iter().map(|e| e.cost).sum();
    let cost_per_hire = (recruit_hires > 0).then(|| total_cost / Decimal::from(recruit_hires));

    let describe = |value: Option<Decimal>| {
        value.map_or_else(|| "undefined".to_string(), |v| v.normalize().to_string())
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "recruiting_funnel".to_string(),
        rule_name: "Recruiting Funnel and Cost".to_string(),
        month: bucket.start_date,
        input: serde_json::json!({
            "closed_requisitions": closed.len(),
            "hired_status": settings.hired_status,
            "total_cost": total_cost.normalize().to_string()
        }),
        output: serde_json::json!({
            "recruit_hires": recruit_hires,
            "time_to_hire": time_to_hire.map(|v| v.normalize().to_string()),
            "cost_per_hire": cost_per_hire.map(|v| v.normalize().to_string())
        }),
        reasoning: format!(
            "{} requisitions closed in {} ({} hired): time-to-hire {}, cost-per-hire {}",
            closed.len(),
            bucket,
            recruit_hires,
            describe(time_to_hire),
            describe(cost_per_hire)
        ),
    };

    RecruitingResult {
        recruit_hires,
        closed_requisitions: closed.len(),
        time_to_hire,
        total_cost,
        cost_per_hire,
        audit_step,
    }
}
