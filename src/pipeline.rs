//! End-to-end pipeline runs.
//!
//! Glue between configuration, the record store, the aggregator and the
//! output writers. The CLI and the dashboard both start from here.

use std::path::{Path, PathBuf};

use tracing::info;
use uuid::Uuid;

use crate::calculation::{aggregate_metrics, aggregation_warnings};
use crate::churn::LinearChurnModel;
use crate::config::ConfigLoader;
use crate::error::EngineResult;
use crate::models::{AggregationReport, AuditTrace};
use crate::output::{read_metrics_table, write_metrics_table};
use crate::records::RecordStore;

/// The outcome of a full aggregation run.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// The validated record sets the run was computed from.
    pub store: RecordStore,
    /// The aggregated metrics with their audit trace.
    pub report: AggregationReport,
    /// Where the metrics table was written.
    pub metrics_path: PathBuf,
}

/// Loads the inputs, aggregates them and writes the metrics table.
///
/// `output` overrides the configured metrics table path. The table is only
/// written once every bucket has been computed; any error leaves the
/// previous table in place.
pub fn run_pipeline(config: &ConfigLoader, output: Option<&Path>) -> EngineResult<PipelineRun> {
    let store = RecordStore::load(config)?;
    let report = aggregate_metrics(&store, config.kpi())?;

    let metrics_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.metrics_path());
    write_metrics_table(&report.rows, &metrics_path)?;

    info!(
        run_id = %report.run_id,
        months = report.rows.len(),
        path = %metrics_path.display(),
        "Pipeline run complete"
    );

    Ok(PipelineRun {
        store,
        report,
        metrics_path,
    })
}

/// Returns the metrics report the dashboard serves.
///
/// When the configured metrics table exists its rows are served as written,
/// with warnings derived from `store` and no audit steps. Otherwise the
/// store is aggregated in memory; nothing is written either way.
pub fn load_metrics_report(
    config: &ConfigLoader,
    store: &RecordStore,
) -> EngineResult<AggregationReport> {
    let metrics_path = config.metrics_path();
    if !metrics_path.is_file() {
        info!(
            path = %metrics_path.display(),
            "No metrics table on disk; aggregating in memory"
        );
        return aggregate_metrics(store, config.kpi());
    }

    let rows = read_metrics_table(&metrics_path)?;
    info!(
        path = %metrics_path.display(),
        months = rows.len(),
        "Serving persisted metrics table"
    );

    Ok(AggregationReport {
        run_id: Uuid::new_v4(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        rows,
        audit_trace: AuditTrace {
            steps: Vec::new(),
            warnings: aggregation_warnings(store),
            duration_us: 0,
        },
    })
}

/// Loads the configured churn model, checked against the feature schema.
///
/// Returns `Ok(None)` when no model is configured.
///
/// # Errors
///
/// - `ConfigNotFound` if a model is configured without a feature schema
/// - `MissingFile`, `MalformedFile` or `FeatureSchemaMismatch` from loading
///   the artifact
pub fn load_churn_model(config: &ConfigLoader) -> EngineResult<Option<LinearChurnModel>> {
    config
        .churn_model_path()
        .map(|path| LinearChurnModel::load(&path, config.require_feature_schema()?))
        .transpose()
}
