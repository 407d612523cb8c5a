//! Query parameter types for the dashboard data API.

use serde::{Deserialize, Serialize};

use super::response::ApiError;

/// Number of employees returned by `/churn/top` when no limit is given.
pub const DEFAULT_TOP_LIMIT: usize = 10;

/// Number of histogram bins returned by `/churn/distribution` by default.
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

/// Largest accepted number of histogram bins.
pub const MAX_HISTOGRAM_BINS: usize = 100;

/// Query parameters of `/churn/top`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopRiskQuery {
    /// Maximum number of employees to return.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl TopRiskQuery {
    /// Returns the requested limit, or the default.
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_TOP_LIMIT)
    }
}

/// Query parameters of `/churn/distribution`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistributionQuery {
    /// Number of equal-width bins over `[0, 1]`.
    #[serde(default)]
    pub bins: Option<usize>,
}

impl DistributionQuery {
    /// Returns the requested bin count, or a validation error when it is
    /// outside `1..=MAX_HISTOGRAM_BINS`.
    pub fn bins(&self) -> Result<usize, ApiError> {
        match self.bins.unwrap_or(DEFAULT_HISTOGRAM_BINS) {
            bins @ 1..=MAX_HISTOGRAM_BINS => Ok(bins),
            other => Err(ApiError::validation_error(format!(
                "bins must be between 1 and {}, got {}",
                MAX_HISTOGRAM_BINS, other
            ))),
        }
    }
}
