//! HR KPI engine.
//!
//! This crate aggregates employee, absence and recruiting records into a
//! monthly KPI table (headcount, turnover, absenteeism, recruiting funnel and
//! cost), scores employee attrition risk against a versioned feature schema,
//! and serves both to a dashboard through a read-only JSON API.

#![warn(missing_docs)]

pub mod calculation;
pub mod churn;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod records;
