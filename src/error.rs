//! Error types for the HR KPI engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while loading records, computing
//! monthly KPIs, and scoring churn risk.

use thiserror::Error;

/// The main error type for the HR KPI engine.
///
/// Every error is fatal to a pipeline run: the engine either produces a
/// complete metrics table or nothing at all.
///
/// # Example
///
/// ```
/// use hr_kpi_engine::error::EngineError;
///
/// let error = EngineError::MissingFile {
///     path: "/data/employees.csv".to_string(),
/// };
/// assert_eq!(error.to_string(), "Input file not found: /data/employees.csv");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A record set required for aggregation contained no records.
    #[error("No {record_set} records to aggregate")]
    EmptyInput {
        /// The name of the empty record set (e.g., "employee").
        record_set: String,
    },

    /// A record violated one of its invariants.
    #[error("Data integrity violation in {record} '{key}': {rule}")]
    DataIntegrity {
        /// The kind of record (e.g., "employee", "absence").
        record: String,
        /// The identifying key of the offending record.
        key: String,
        /// The rule that was violated.
        rule: String,
    },

    /// An expected input file was absent at pipeline start.
    #[error("Input file not found: {path}")]
    MissingFile {
        /// The path that was not found.
        path: String,
    },

    /// An input file could not be read as the expected tabular structure.
    #[error("Malformed input file '{path}': {message}")]
    MalformedFile {
        /// The path to the malformed file.
        path: String,
        /// A description of the structural problem.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Churn features did not match the versioned feature schema.
    #[error("Feature schema mismatch: {message}")]
    FeatureSchemaMismatch {
        /// A description of the mismatch.
        message: String,
    },

    /// The metrics table could not be written.
    #[error("Failed to write output '{path}': {message}")]
    OutputWrite {
        /// The destination path.
        path: String,
        /// A description of the write failure.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Builds a [`EngineError::DataIntegrity`] for the given record and rule.
    pub fn integrity(
        record: impl Into<String>,
        key: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        EngineError::DataIntegrity {
            record: record.into(),
            key: key.into(),
            rule: rule.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
