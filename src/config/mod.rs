//! Configuration loading and management for the HR KPI engine.
//!
//! This module loads the pipeline configuration from YAML files: where the
//! input record sets live, where the metrics table is written, the KPI
//! constants, the dashboard bind address, and the churn feature schema.
//!
//! # Example
//!
//! ```no_run
//! use hr_kpi_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/hr_kpi").unwrap();
//! println!("Employees: {}", config.employees_path().display());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    ChurnModelSettings, DEFAULT_DASHBOARD_BIND, DEFAULT_WORKING_DAYS_PER_EMPLOYEE,
    DashboardSettings, InputFiles, KpiSettings, OutputSettings, PipelineFile,
};
