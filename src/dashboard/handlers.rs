//! HTTP request handlers for the dashboard data API.
//!
//! Every endpoint is a read-only view over the state computed at startup.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{absences_by_type, mean_absence_by_department};
use crate::churn::{probability_histogram, top_at_risk};

use super::request::{DistributionQuery, TopRiskQuery};
use super::response::{
    ApiError, ApiErrorResponse, DistributionResponse, HealthResponse, MetricsTableResponse,
    TopRiskResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/metrics/latest", get(latest_metrics_handler))
        .route("/absences/by-type", get(absences_by_type_handler))
        .route("/absences/by-department", get(absences_by_department_handler))
        .route("/churn/top", get(churn_top_handler))
        .route("/churn/distribution", get(churn_distribution_handler))
        .with_state(state)
}

fn json_ok<T: Serialize>(body: T) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn query_error(correlation_id: Uuid, rejection: QueryRejection) -> Response {
    let body_text = rejection.body_text();
    warn!(correlation_id = %correlation_id, error = %body_text, "Invalid query string");
    ApiErrorResponse::new(StatusCode::BAD_REQUEST, ApiError::validation_error(body_text))
        .into_response()
}

/// Handler for GET /health.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    json_ok(HealthResponse {
        status: "ok".to_string(),
        engine_version: state.report().engine_version.clone(),
        run_id: state.report().run_id,
        churn_enabled: state.churn().is_some(),
    })
}

/// Handler for GET /metrics.
///
/// Returns every row of the metrics table with the run's warnings.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    let report = state.report();
    info!(
        correlation_id = %correlation_id,
        rows = report.rows.len(),
        "Serving metrics table"
    );

    json_ok(MetricsTableResponse {
        run_id: report.run_id,
        rows: report.rows.clone(),
        warnings: report.audit_trace.warnings.clone(),
    })
}

/// Handler for GET /metrics/latest.
async fn latest_metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();

    match state.report().latest() {
        Some(row) => {
            info!(correlation_id = %correlation_id, month = %row.month, "Serving latest metrics");
            json_ok(row)
        }
        None => {
            warn!(correlation_id = %correlation_id, "Metrics table is empty");
            ApiErrorResponse::new(StatusCode::NOT_FOUND, ApiError::metrics_empty()).into_response()
        }
    }
}

/// Handler for GET /absences/by-type.
async fn absences_by_type_handler(State(state): State<AppState>) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    let counts = absences_by_type(state.store().absences());
    info!(correlation_id = %correlation_id, groups = counts.len(), "Serving absences by type");
    json_ok(counts)
}

/// Handler for GET /absences/by-department.
async fn absences_by_department_handler(State(state): State<AppState>) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    let store = state.store();
    let departments = mean_absence_by_department(store.absences(), store.employees());
    info!(
        correlation_id = %correlation_id,
        departments = departments.len(),
        "Serving absences by department"
    );
    json_ok(departments)
}

/// Handler for GET /churn/top.
///
/// Returns the currently employed employees most likely to leave.
async fn churn_top_handler(
    State(state): State<AppState>,
    query: Result<Query<TopRiskQuery>, QueryRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return query_error(correlation_id, rejection),
    };

    let Some(churn) = state.churn() else {
        warn!(correlation_id = %correlation_id, "Churn requested without a model");
        return ApiErrorResponse::new(StatusCode::NOT_FOUND, ApiError::churn_model_unavailable())
            .into_response();
    };

    let employees = top_at_risk(&churn.scores, query.limit());
    info!(
        correlation_id = %correlation_id,
        limit = query.limit(),
        returned = employees.len(),
        "Serving top churn risks"
    );

    json_ok(TopRiskResponse {
        as_of: state.as_of(),
        schema_version: churn.schema_version.clone(),
        employees,
    })
}

/// Handler for GET /churn/distribution.
async fn churn_distribution_handler(
    State(state): State<AppState>,
    query: Result<Query<DistributionQuery>, QueryRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return query_error(correlation_id, rejection),
    };

    let bins = match query.bins() {
        Ok(bins) => bins,
        Err(error) => {
            warn!(correlation_id = %correlation_id, error = %error.message, "Invalid bin count");
            return ApiErrorResponse::new(StatusCode::BAD_REQUEST, error).into_response();
        }
    };

    let Some(churn) = state.churn() else {
        warn!(correlation_id = %correlation_id, "Churn requested without a model");
        return ApiErrorResponse::new(StatusCode::NOT_FOUND, ApiError::churn_model_unavailable())
            .into_response();
    };

    match probability_histogram(&churn.scores, bins) {
        Ok(histogram) => {
            info!(correlation_id = %correlation_id, bins, "Serving churn distribution");
            json_ok(DistributionResponse {
                as_of: state.as_of(),
                total: churn.scores.len(),
                bins: histogram,
            })
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Histogram failed");
            ApiErrorResponse::from(err).into_response()
        }
    }
}
