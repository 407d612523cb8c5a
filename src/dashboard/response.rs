//! Response types for the dashboard data API.
//!
//! This module defines the response bodies and the JSON error structure
//! returned by every endpoint.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::churn::{ChurnScore, HistogramBin};
use crate::error::EngineError;
use crate::models::{AuditWarning, MonthlyMetrics};

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: String,
    /// Engine version that computed the metrics.
    pub engine_version: String,
    /// Identifier of the aggregation run being served.
    pub run_id: Uuid,
    /// Whether churn endpoints are available.
    pub churn_enabled: bool,
}

/// Body of `GET /metrics`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsTableResponse {
    /// Identifier of the aggregation run.
    pub run_id: Uuid,
    /// One row per month, ascending.
    pub rows: Vec<MonthlyMetrics>,
    /// Warnings raised during aggregation.
    pub warnings: Vec<AuditWarning>,
}

/// Body of `GET /churn/top`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopRiskResponse {
    /// Date tenure and age were measured against.
    pub as_of: NaiveDate,
    /// Feature schema version of the scores.
    pub schema_version: String,
    /// Employees ordered by attrition probability, highest first.
    pub employees: Vec<ChurnScore>,
}

/// Body of `GET /churn/distribution`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionResponse {
    /// Date tenure and age were measured against.
    pub as_of: NaiveDate,
    /// Number of scored employees.
    pub total: usize,
    /// Histogram bins over `[0, 1]`.
    pub bins: Vec<HistogramBin>,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates the error returned by churn endpoints without scores.
    pub fn churn_model_unavailable() -> Self {
        Self::with_details(
            "CHURN_MODEL_UNAVAILABLE",
            "Churn scores are not available",
            "Either no churn model is configured or scoring failed at startup; see the server log",
        )
    }

    /// Creates the error returned when the metrics table has no rows.
    pub fn metrics_empty() -> Self {
        Self::new("METRICS_EMPTY", "The metrics table has no rows")
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Pairs an error body with a status code.
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let (status, code) = match &error {
            EngineError::EmptyInput { .. } => (StatusCode::NOT_FOUND, "EMPTY_INPUT"),
            EngineError::DataIntegrity { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "DATA_INTEGRITY")
            }
            EngineError::MissingFile { .. } | EngineError::MalformedFile { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INPUT_ERROR")
            }
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR")
            }
            EngineError::FeatureSchemaMismatch { .. } => {
                (StatusCode::CONFLICT, "FEATURE_SCHEMA_MISMATCH")
            }
            EngineError::OutputWrite { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "OUTPUT_ERROR"),
            EngineError::CalculationError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CALCULATION_ERROR")
            }
        };

        ApiErrorResponse {
            status,
            error: ApiError::new(code, message),
        }
    }
}
