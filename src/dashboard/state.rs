//! Application state for the dashboard data API.
//!
//! This module defines the shared, read-only state that is available to
//! all request handlers.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::churn::{ChurnScore, score_employees};
use crate::config::ConfigLoader;
use crate::error::EngineResult;
use crate::models::AggregationReport;
use crate::pipeline::{load_churn_model, load_metrics_report};
use crate::records::RecordStore;

/// Churn scores computed once at startup.
#[derive(Debug, Clone)]
pub struct ChurnContext {
    /// The feature schema version the scores were produced with.
    pub schema_version: String,
    /// One score per employee, in record order.
    pub scores: Vec<ChurnScore>,
}

/// Shared application state.
///
/// Everything is computed before the server starts and never mutated
/// afterwards; handlers only read.
#[derive(Clone)]
pub struct AppState {
    report: Arc<AggregationReport>,
    store: Arc<RecordStore>,
    churn: Option<Arc<ChurnContext>>,
    as_of: NaiveDate,
}

impl AppState {
    /// Creates a state over an aggregated report and its record store.
    pub fn new(report: AggregationReport, store: RecordStore, as_of: NaiveDate) -> Self {
        Self {
            report: Arc::new(report),
            store: Arc::new(store),
            churn: None,
            as_of,
        }
    }

    /// Attaches precomputed churn scores.
    pub fn with_churn(mut self, churn: ChurnContext) -> Self {
        self.churn = Some(Arc::new(churn));
        self
    }

    /// Loads the records and the metrics report, and scores churn when a
    /// model is configured.
    ///
    /// Churn is optional for the dashboard: if the model cannot be loaded or
    /// any employee cannot be scored against `as_of`, the error is logged
    /// and the churn endpoints are disabled while the KPI endpoints are
    /// still served. Nothing is written to disk.
    ///
    /// # Errors
    ///
    /// Fails only when the records or the metrics report cannot be loaded.
    pub fn from_config(config: &ConfigLoader, as_of: NaiveDate) -> EngineResult<Self> {
        let store = RecordStore::load(config)?;
        let report = load_metrics_report(config, &store)?;

        let churn = match Self::score_churn(config, &store, as_of) {
            Ok(Some(churn)) => Some(churn),
            Ok(None) => {
                info!("No churn model configured; churn endpoints disabled");
                None
            }
            Err(error) => {
                warn!(%error, as_of = %as_of, "Churn scoring failed; churn endpoints disabled");
                None
            }
        };

        let state = Self::new(report, store, as_of);
        Ok(match churn {
            Some(churn) => state.with_churn(churn),
            None => state,
        })
    }

    fn score_churn(
        config: &ConfigLoader,
        store: &RecordStore,
        as_of: NaiveDate,
    ) -> EngineResult<Option<ChurnContext>> {
        let Some(model) = load_churn_model(config)? else {
            return Ok(None);
        };
        let schema = config.require_feature_schema()?;
        let scores = score_employees(store.employees(), as_of, schema, &model)?;

        Ok(Some(ChurnContext {
            schema_version: schema.version.clone(),
            scores,
        }))
    }

    /// Returns the aggregated metrics report.
    pub fn report(&self) -> &AggregationReport {
        &self.report
    }

    /// Returns the record store.
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Returns the churn scores, if a model is configured.
    pub fn churn(&self) -> Option<&ChurnContext> {
        self.churn.as_deref()
    }

    /// Returns the date churn features were measured against.
    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }
}
