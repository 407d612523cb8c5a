//! Churn scoring, at-risk ranking and score distribution.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::Employee;

use super::features::build_feature_vector;
use super::predictor::ChurnPredictor;
use super::schema::FeatureSchema;

/// Attrition probability for one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnScore {
    /// The employee's identifier.
    pub employee_id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Department.
    pub department: String,
    /// Contract type.
    pub contract: String,
    /// Monthly salary.
    pub salary: Decimal,
    /// Whether the employee is still employed on the scoring date.
    pub still_employed: bool,
    /// Predicted probability of attrition.
    pub probability: f64,
}

/// One bar of the probability histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    /// Inclusive lower edge.
    pub lower: f64,
    /// Upper edge; inclusive only for the last bin.
    pub upper: f64,
    /// Number of scores in the bin.
    pub count: usize,
}

/// Scores every employee with `predictor`.
///
/// # Errors
///
/// - `FeatureSchemaMismatch` if the predictor was trained against another
///   schema version, or an employee has an unknown categorical value
/// - `DataIntegrity` if an employee was hired or born after `as_of`
pub fn score_employees<P: ChurnPredictor + ?Sized>(
    employees: &[Employee],
    as_of: NaiveDate,
    schema: &FeatureSchema,
    predictor: &P,
) -> EngineResult<Vec<ChurnScore>> {
    if predictor.schema_version() != schema.version {
        return Err(EngineError::FeatureSchemaMismatch {
            message: format!(
                "predictor expects schema '{}' but '{}' is configured",
                predictor.schema_version(),
                schema.version
            ),
        });
    }

    let scores = employees
        .iter()
        .map(|employee| {
            let features = build_feature_vector(employee, as_of, schema)?;
            Ok(ChurnScore {
                employee_id: employee.id.clone(),
                first_name: employee.first_name.clone(),
                last_name: employee.last_name.clone(),
                department: employee.department.clone(),
                contract: employee.contract.clone(),
                salary: employee.salary,
                still_employed: employee.is_employed_on(as_of),
                probability: predictor.predict_proba(&features)?,
            })
        })
        .collect::<EngineResult<Vec<_>>>()?;

    info!(
        employees = scores.len(),
        as_of = %as_of,
        schema_version = %schema.version,
        "Scored employees for churn"
    );
    Ok(scores)
}

/// Returns the `limit` currently employed employees most likely to leave.
///
/// Ordered by probability, highest first; ties are broken by employee id.
pub fn top_at_risk(scores: &[ChurnScore], limit: usize) -> Vec<ChurnScore> {
    let mut at_risk: Vec<ChurnScore> = scores
        .iter()
        .filter(|s| s.still_employed)
        .cloned()
        .collect();

    at_risk.sort_by(|a, b| {
        b.probability
            .total_cmp(&a.probability)
            .then_with(|| a.employee_id.cmp(&b.employee_id))
    });
    at_risk.truncate(limit);
    at_risk
}

/// Buckets probabilities into `bins` equal-width bins over `[0, 1]`.
///
/// Every score lands in exactly one bin; a probability of exactly `1.0`
/// counts in the last bin.
///
/// # Errors
///
/// Returns `CalculationError` if `bins` is zero.
pub fn probability_histogram(scores: &[ChurnScore], bins: usize) -> EngineResult<Vec<HistogramBin>> {
    if bins == 0 {
        return Err(EngineError::CalculationError {
            message: "histogram needs at least one bin".to_string(),
        });
    }

    let width = 1.0 / bins as f64;
    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: i as f64 * width,
            upper: if i + 1 == bins { 1.0 } else { (i + 1) as f64 * width },
            count: 0,
        })
        .collect();

    for score in scores {
        let clamped = score.probability.clamp(0.0, 1.0);
        let index = ((clamped * bins as f64).floor() as usize).min(bins - 1);
        histogram[index].count += 1;
    }

    Ok(histogram)
}
