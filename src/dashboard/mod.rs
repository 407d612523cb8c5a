//! Read-only HTTP data API for the HR dashboard.
//!
//! This module serves the metrics table, absence breakdowns and churn
//! scores as JSON. It never writes back to any record set.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    DEFAULT_HISTOGRAM_BINS, DEFAULT_TOP_LIMIT, DistributionQuery, MAX_HISTOGRAM_BINS,
    TopRiskQuery,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::{AppState, ChurnContext};
