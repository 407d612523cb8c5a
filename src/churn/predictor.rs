//! Churn model inference.
//!
//! The [`ChurnPredictor`] trait is the seam between feature engineering and
//! whatever model produced the scores. [`LinearChurnModel`] is the shipped
//! implementation: a logistic model loaded from a YAML artifact whose
//! feature names must match the feature schema exactly.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngineError, EngineResult};

use super::features::FeatureVector;
use super::schema::FeatureSchema;

/// Predicts the probability that an employee leaves.
pub trait ChurnPredictor {
    /// The feature schema version the predictor was trained against.
    fn schema_version(&self) -> &str;

    /// Returns the attrition probability in `[0, 1]` for one feature vector.
    ///
    /// # Errors
    ///
    /// Returns `FeatureSchemaMismatch` when the vector was built against a
    /// different schema or has the wrong number of values.
    fn predict_proba(&self, features: &FeatureVector) -> EngineResult<f64>;
}

/// A logistic regression model artifact.
///
/// ```yaml
/// schema_version: churn-features-v1
/// feature_names: [salary, tenure_days, age, gender_M]
/// intercept: -1.2
/// coefficients: [-0.0002, -0.0004, 0.01, 0.05]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearChurnModel {
    /// The feature schema version the model was fitted against.
    pub schema_version: String,
    /// Column names, in coefficient order.
    pub feature_names: Vec<String>,
    /// The bias term.
    pub intercept: f64,
    /// One weight per feature.
    pub coefficients: Vec<f64>,
}

impl LinearChurnModel {
    /// Loads a model artifact and checks it against `schema`.
    ///
    /// # Errors
    ///
    /// - `MissingFile` if the artifact does not exist
    /// - `MalformedFile` if it cannot be read or parsed
    /// - `FeatureSchemaMismatch` if it does not match `schema`
    pub fn load(path: &Path, schema: &FeatureSchema) -> EngineResult<Self> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => EngineError::MissingFile {
                path: path_str.clone(),
            },
            _ => EngineError::MalformedFile {
                path: path_str.clone(),
                message: e.to_string(),
            },
        })?;

        let model: LinearChurnModel =
            serde_yaml::from_str(&content).map_err(|e| EngineError::MalformedFile {
                path: path_str.clone(),
                message: e.to_string(),
            })?;

        model.check_against(schema)?;

        info!(
            path = %path_str,
            schema_version = %model.schema_version,
            features = model.feature_names.len(),
            "Loaded churn model"
        );
        Ok(model)
    }

    /// Checks that the model was fitted against exactly `schema`'s columns.
    pub fn check_against(&self, schema: &FeatureSchema) -> EngineResult<()> {
        if self.schema_version != schema.version {
            return Err(EngineError::FeatureSchemaMismatch {
                message: format!(
                    "model expects schema '{}' but '{}' is configured",
                    self.schema_version, schema.version
                ),
            });
        }

        if self.coefficients.len() != self.feature_names.len() {
            return Err(EngineError::FeatureSchemaMismatch {
                message: format!(
                    "model has {} coefficients for {} features",
                    self.coefficients.len(),
                    self.feature_names.len()
                ),
            });
        }

        let columns = schema.columns();
        if self.feature_names != columns {
            let missing: Vec<&str> = columns
                .iter()
                .filter(|c| !self.feature_names.contains(c))
                .map(String::as_str)
                .collect();
            let unexpected: Vec<&str> = self
                .feature_names
                .iter()
                .filter(|c| !columns.contains(c))
                .map(String::as_str)
                .collect();
            return Err(EngineError::FeatureSchemaMismatch {
                message: format!(
                    "model features differ from schema columns (missing: [{}], unexpected: [{}])",
                    missing.join(", "),
                    unexpected.join(", ")
                ),
            });
        }

        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(EngineError::FeatureSchemaMismatch {
                message: "model weights must be finite".to_string(),
            });
        }

        Ok(())
    }
}

impl ChurnPredictor for LinearChurnModel {
    fn schema_version(&self) -> &str {
        &self.schema_version
    }

    fn predict_proba(&self, features: &FeatureVector) -> EngineResult<f64> {
        if features.schema_version != self.schema_version
            || features.values.len() != self.coefficients.len()
        {
            return Err(EngineError::FeatureSchemaMismatch {
                message: format!(
                    "features of employee '{}' ({} values, schema '{}') do not fit model ({} weights, schema '{}')",
                    features.employee_id,
                    features.values.len(),
                    features.schema_version,
                    self.coefficients.len(),
                    self.schema_version
                ),
            });
        }

        let z = self.intercept
            + self
                .coefficients
                .iter()
                .zip(&features.values)
                .map(|(w, x)| w * x)
                .sum::<f64>();

        Ok(1.0 / (1.0 + (-z).exp()))
    }
}
