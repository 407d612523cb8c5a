//! Configuration types for the KPI pipeline.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from `pipeline.yaml`.

use std::path::PathBuf;

use serde::Deserialize;

use crate::models::DEFAULT_HIRED_STATUS;

/// Assumed working days per active employee per month.
pub const DEFAULT_WORKING_DAYS_PER_EMPLOYEE: u32 = 21;

/// Default bind address for the dashboard data API.
pub const DEFAULT_DASHBOARD_BIND: &str = "127.0.0.1:8080";

/// File names of the three input record sets, relative to the data directory.
#[derive(Debug, Clone, Deserialize)]
pub struct InputFiles {
    /// The employees file.
    pub employees: PathBuf,
    /// The monthly absences file.
    pub absences: PathBuf,
    /// The recruiting requisitions file.
    pub recruiting: PathBuf,
}

/// Where the metrics table is written, relative to the data directory.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    /// The monthly metrics table file.
    pub metrics: PathBuf,
}

/// Constants used by the KPI derivations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KpiSettings {
    /// Working days assumed per active employee per month.
    #[serde(default = "default_working_days_per_employee")]
    pub working_days_per_employee: u32,
    /// Requisition status that counts as a successful hire.
    #[serde(default = "default_hired_status")]
    pub hired_status: String,
}

impl Default for KpiSettings {
    fn default() -> Self {
        Self {
            working_days_per_employee: DEFAULT_WORKING_DAYS_PER_EMPLOYEE,
            hired_status: DEFAULT_HIRED_STATUS.to_string(),
        }
    }
}

fn default_working_days_per_employee() -> u32 {
    DEFAULT_WORKING_DAYS_PER_EMPLOYEE
}

fn default_hired_status() -> String {
    DEFAULT_HIRED_STATUS.to_string()
}

/// Dashboard data API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardSettings {
    /// Socket address the API listens on.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    DEFAULT_DASHBOARD_BIND.to_string()
}

/// Location of the trained churn model artifact.
#[derive(Debug, Clone, Deserialize)]
pub struct ChurnModelSettings {
    /// The model file, relative to the data directory.
    pub model: PathBuf,
}

/// Structure of `pipeline.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineFile {
    /// Directory holding the input and output files, relative to the
    /// configuration directory.
    pub data_dir: PathBuf,
    /// Input record set files.
    pub inputs: InputFiles,
    /// Output files.
    pub output: OutputSettings,
    /// KPI derivation constants.
    #[serde(default)]
    pub kpi: KpiSettings,
    /// Dashboard API settings.
    #[serde(default)]
    pub dashboard: DashboardSettings,
    /// Churn model settings; churn scoring is disabled when absent.
    #[serde(default)]
    pub churn: Option<ChurnModelSettings>,
}
