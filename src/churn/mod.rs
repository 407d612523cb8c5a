//! Employee attrition ("churn") scoring.
//!
//! This module owns the versioned feature schema, feature engineering
//! relative to an explicit `as_of` date, training-set export for an external
//! trainer, and inference against a trained linear model. It consumes
//! employee records only and never the metrics table.

mod features;
mod predictor;
mod schema;
mod scoring;

pub use features::{
    FeatureVector, TrainingRow, TrainingSet, build_feature_vector, build_training_set,
    write_training_set,
};
pub use predictor::{ChurnPredictor, LinearChurnModel};
pub use schema::{CategoricalColumn, CategoricalLevels, FeatureSchema, NumericFeature};
pub use scoring::{ChurnScore, HistogramBin, probability_histogram, score_employees, top_at_risk};
