//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the pipeline
//! configuration and the churn feature schema from YAML files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::churn::FeatureSchema;
use crate::error::{EngineError, EngineResult};

use super::types::{DashboardSettings, KpiSettings, PipelineFile};

/// Loads and provides access to the pipeline configuration.
///
/// # Directory Structure
///
/// ```text
/// config/hr_kpi/
/// ├── pipeline.yaml        # Input/output files, KPI constants, dashboard
/// └── feature_schema.yaml  # Versioned churn feature schema (optional)
/// ```
///
/// Relative `data_dir` values resolve against the configuration directory;
/// input, output and model paths resolve against `data_dir`.
///
/// # Example
///
/// ```no_run
/// use hr_kpi_engine::config::ConfigLoader;
///
/// let config = ConfigLoader::load("./config/hr_kpi").unwrap();
/// println!("Metrics table: {}", config.metrics_path().display());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pipeline: PipelineFile,
    data_dir: PathBuf,
    feature_schema: Option<FeatureSchema>,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `pipeline.yaml` is missing (`ConfigNotFound`)
    /// - Any present file contains invalid YAML (`ConfigParseError`)
    /// - A setting is out of range (`ConfigParseError`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let pipeline_path = path.join("pipeline.yaml");
        let pipeline = Self::load_yaml::<PipelineFile>(&pipeline_path)?;

        if pipeline.kpi.working_days_per_employee == 0 {
            return Err(EngineError::ConfigParseError {
                path: pipeline_path.display().to_string(),
                message: "kpi.working_days_per_employee must be positive".to_string(),
            });
        }

        let schema_path = path.join("feature_schema.yaml");
        let feature_schema = if schema_path.exists() {
            let schema = Self::load_yaml::<FeatureSchema>(&schema_path)?;
            schema.validate().map_err(|e| EngineError::ConfigParseError {
                path: schema_path.display().to_string(),
                message: e.to_string(),
            })?;
            Some(schema)
        } else {
            debug!(path = %schema_path.display(), "No feature schema configured");
            None
        };

        let data_dir = path.join(&pipeline.data_dir);

        Ok(Self {
            pipeline,
            data_dir,
            feature_schema,
        })
    }

    /// Loads and parses a YAML file.
    pub(crate) fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the resolved data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the path of the employees file.
    pub fn employees_path(&self) -> PathBuf {
        self.data_dir.join(&self.pipeline.inputs.employees)
    }

    /// Returns the path of the absences file.
    pub fn absences_path(&self) -> PathBuf {
        self.data_dir.join(&self.pipeline.inputs.absences)
    }

    /// Returns the path of the recruiting file.
    pub fn recruiting_path(&self) -> PathBuf {
        self.data_dir.join(&self.pipeline.inputs.recruiting)
    }

    /// Returns the path the metrics table is written to.
    pub fn metrics_path(&self) -> PathBuf {
        self.data_dir.join(&self.pipeline.output.metrics)
    }

    /// Returns the KPI derivation constants.
    pub fn kpi(&self) -> &KpiSettings {
        &self.pipeline.kpi
    }

    /// Returns the dashboard settings.
    pub fn dashboard(&self) -> &DashboardSettings {
        &self.pipeline.dashboard
    }

    /// Returns the churn feature schema, if one is configured.
    pub fn feature_schema(&self) -> Option<&FeatureSchema> {
        self.feature_schema.as_ref()
    }

    /// Returns the feature schema, failing if none is configured.
    pub fn require_feature_schema(&self) -> EngineResult<&FeatureSchema> {
        self.feature_schema
            .as_ref()
            .ok_or_else(|| EngineError::ConfigNotFound {
                path: "feature_schema.yaml".to_string(),
            })
    }

    /// Returns the path of the churn model artifact, if one is configured.
    pub fn churn_model_path(&self) -> Option<PathBuf> {
        self.pipeline
            .churn
            .as_ref()
            .map(|churn| self.data_dir.join(&churn.model))
    }
}
