//! Integration tests for the HR KPI engine.
//!
//! This test suite covers:
//! - End-to-end aggregation from CSV inputs to the metrics table file
//! - Month boundary handling across the whole pipeline
//! - Undefined recruiting ratios in the written table
//! - Input error cases (missing files, integrity violations, empty input)
//! - Churn feature export and scoring on the sample data
//! - The dashboard data API over the sample configuration, including a
//!   persisted metrics table and churn scoring that fails at startup

use std::fs;
use std::path::Path;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use hr_kpi_engine::churn::{build_training_set, score_employees, top_at_risk, write_training_set};
use hr_kpi_engine::config::ConfigLoader;
use hr_kpi_engine::dashboard::{AppState, create_router};
use hr_kpi_engine::error::EngineError;
use hr_kpi_engine::output::{METRICS_COLUMNS, read_metrics_table, write_metrics_table};
use hr_kpi_engine::pipeline::{load_churn_model, run_pipeline};
use hr_kpi_engine::records::RecordStore;

// =============================================================================
// Test Helpers
// =============================================================================

const SAMPLE_CONFIG: &str = "./config/hr_kpi";

const EMPLOYEES_HEADER: &str =
    "emp_id,first_name,last_name,gender,dob,department,site,contract,hire_date,leave_date,salary\n";
const ABSENCES_HEADER: &str = "emp_id,month,absent_days,absence_type\n";
const RECRUITING_HEADER: &str =
    "req_id,open_date,close_date,status,offers_made,offers_accepted,time_to_hire,cost\n";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// Writes a pipeline.yaml and the three input files into `dir`.
fn write_inputs(dir: &Path, employees: &str, absences: &str, recruiting: &str) {
    fs::write(
        dir.join("pipeline.yaml"),
        r#"
data_dir: data
inputs:
  employees: employees.csv
  absences: absences.csv
  recruiting: recruiting.csv
output:
  metrics: metrics_monthly.csv
"#,
    )
    .unwrap();
    let data = dir.join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("employees.csv"), format!("{}{}", EMPLOYEES_HEADER, employees)).unwrap();
    fs::write(data.join("absences.csv"), format!("{}{}", ABSENCES_HEADER, absences)).unwrap();
    fs::write(data.join("recruiting.csv"), format!("{}{}", RECRUITING_HEADER, recruiting)).unwrap();
}

fn read_table(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(header, METRICS_COLUMNS);
    reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect()
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

// =============================================================================
// SECTION 1: End-to-end aggregation
// =============================================================================

#[test]
fn test_single_employee_hire_absence_leave() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(
        dir.path(),
        "1,Léa,Moreau,F,1992-03-08,RH,Paris,CDI,2024-01-10,2024-03-20,3100\n",
        "1,2024-02-01,2,Maladie\n1,2024-03-01,0,Autre\n",
        "",
    );
    let config = ConfigLoader::load(dir.path()).unwrap();

    let run = run_pipeline(&config, None).unwrap();
    let rows = read_table(&run.metrics_path);

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][0], "2024-01-01");
    assert_eq!(&rows[0][1..4], ["1", "1", "0"]);
    assert_eq!(dec(&rows[0][4]), Decimal::ZERO);

    assert_eq!(rows[1][0], "2024-02-01");
    assert_eq!(rows[1][5], "2");
    assert_eq!(dec(&rows[1][6]), Decimal::from(2) / Decimal::from(21));

    assert_eq!(rows[2][0], "2024-03-01");
    assert_eq!(&rows[2][1..4], ["1", "0", "1"]);
    assert_eq!(dec(&rows[2][4]), Decimal::ONE);

    for row in &rows {
        assert_eq!(row[7], "0");
        assert_eq!(row[8], "", "time_to_hire must be empty when nothing closed");
        assert_eq!(row[9], "", "cost_per_hire must be empty when nobody was hired");
    }
}

#[test]
fn test_recruiting_metrics_in_table() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(
        dir.path(),
        "1,Hugo,Roux,M,1985-05-01,IT,Lyon,CDI,2024-01-02,,3500\n",
        "1,2024-02-01,1,Congé\n",
        "R1,2024-01-05,2024-02-04,Hired,2,1,30,4000\n\
         R2,2024-01-10,2024-02-19,Closed-no-hire,1,0,40,1000\n\
         R3,2024-02-01,,Open,0,0,,700\n",
    );
    let config = ConfigLoader::load(dir.path()).unwrap();

    let run = run_pipeline(&config, None).unwrap();
    let february = run.report.row_for(date(2024, 2, 1)).unwrap();

    assert_eq!(february.recruit_hires, 1);
    assert_eq!(february.time_to_hire, Some(Decimal::from(35)));
    assert_eq!(february.cost_per_hire, Some(Decimal::from(5000)));

    let january = run.report.row_for(date(2024, 1, 1)).unwrap();
    assert_eq!(january.time_to_hire, None);

    let codes: Vec<&str> = run
        .report
        .audit_trace
        .warnings
        .iter()
        .map(|w| w.code.as_str())
        .collect();
    assert_eq!(codes, vec!["OPEN_REQUISITIONS"]);
}

#[test]
fn test_month_end_boundaries_across_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(
        dir.path(),
        "1,Jade,Petit,F,1990-01-01,Ops,Nantes,CDD,2024-01-31,2024-02-29,2400\n\
         2,Paul,Girard,M,1991-01-01,Ops,Nantes,CDI,2024-02-01,,2500\n",
        "2,2024-03-01,1,Maladie\n",
        "",
    );
    let config = ConfigLoader::load(dir.path()).unwrap();

    let report = run_pipeline(&config, None).unwrap().report;

    let hires: Vec<usize> = report.rows.iter().map(|r| r.hires).collect();
    let leaves: Vec<usize> = report.rows.iter().map(|r| r.leaves).collect();
    let active: Vec<usize> = report.rows.iter().map(|r| r.active_count).collect();
    assert_eq!(hires, vec![1, 1, 0]);
    assert_eq!(leaves, vec![0, 1, 0]);
    assert_eq!(active, vec![1, 2, 1]);
}

#[test]
fn test_sample_data_reconciles() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigLoader::load(SAMPLE_CONFIG).unwrap();

    let run = run_pipeline(&config, Some(&dir.path().join("metrics.csv"))).unwrap();
    let rows = &run.report.rows;

    assert!(rows.len() >= 24);
    for pair in rows.windows(2) {
        assert_eq!(
            pair[1].active_count,
            pair[0].active_count + pair[1].hires - pair[0].leaves,
            "headcount does not reconcile at {}",
            pair[1].month
        );
    }
    assert_eq!(read_table(&run.metrics_path).len(), rows.len());
}

// =============================================================================
// SECTION 2: Error cases
// =============================================================================

#[test]
fn test_missing_input_file_fails_before_reading() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), "", "", "");
    fs::remove_file(dir.path().join("data/recruiting.csv")).unwrap();
    let config = ConfigLoader::load(dir.path()).unwrap();

    match run_pipeline(&config, None) {
        Err(EngineError::MissingFile { path }) => assert!(path.ends_with("recruiting.csv")),
        other => panic!("Expected MissingFile error, got {:?}", other.map(|r| r.metrics_path)),
    }
}

#[test]
fn test_leave_before_hire_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(
        dir.path(),
        "9,Zoé,Michel,F,1990-01-01,IT,Paris,CDI,2024-05-01,2024-04-30,3000\n",
        "",
        "",
    );
    let config = ConfigLoader::load(dir.path()).unwrap();

    match run_pipeline(&config, None) {
        Err(EngineError::DataIntegrity { key, .. }) => assert_eq!(key, "9"),
        other => panic!("Expected DataIntegrity error, got {:?}", other.map(|r| r.metrics_path)),
    }
    assert!(!config.metrics_path().exists());
}

#[test]
fn test_negative_absent_days_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(
        dir.path(),
        "1,Zoé,Michel,F,1990-01-01,IT,Paris,CDI,2024-01-01,,3000\n",
        "1,2024-01-01,-2,Maladie\n",
        "",
    );
    let config = ConfigLoader::load(dir.path()).unwrap();

    let result = run_pipeline(&config, None);
    assert!(matches!(result, Err(EngineError::DataIntegrity { .. })));
}

#[test]
fn test_empty_employee_file_is_empty_input() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), "", "", "");
    let config = ConfigLoader::load(dir.path()).unwrap();

    let result = run_pipeline(&config, None);
    assert!(matches!(result, Err(EngineError::EmptyInput { .. })));
}

#[test]
fn test_failed_run_keeps_previous_table() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(
        dir.path(),
        "1,Léa,Moreau,F,1992-03-08,RH,Paris,CDI,2024-01-10,,3100\n",
        "",
        "",
    );
    let config = ConfigLoader::load(dir.path()).unwrap();
    run_pipeline(&config, None).unwrap();
    let before = fs::read_to_string(config.metrics_path()).unwrap();

    fs::write(
        dir.path().join("data/employees.csv"),
        format!("{}1,Léa,Moreau,F,not-a-date,RH,Paris,CDI,2024-01-10,,3100\n", EMPLOYEES_HEADER),
    )
    .unwrap();
    assert!(run_pipeline(&config, None).is_err());

    assert_eq!(fs::read_to_string(config.metrics_path()).unwrap(), before);
}

// =============================================================================
// SECTION 3: Churn features and scoring
// =============================================================================

#[test]
fn test_training_set_export_on_sample_data() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigLoader::load(SAMPLE_CONFIG).unwrap();
    let schema = config.require_feature_schema().unwrap();
    let store = RecordStore::load(&config).unwrap();
    let path = dir.path().join("training.csv");

    let set = build_training_set(store.employees(), date(2025, 1, 1), schema).unwrap();
    write_training_set(&set, &path).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(header.first().map(String::as_str), Some("emp_id"));
    assert_eq!(header.last().map(String::as_str), Some("left"));
    assert_eq!(&header[1..header.len() - 1], schema.columns().as_slice());
    assert_eq!(reader.records().count(), store.employees().len());
}

#[test]
fn test_features_are_deterministic_for_fixed_as_of() {
    let config = ConfigLoader::load(SAMPLE_CONFIG).unwrap();
    let schema = config.require_feature_schema().unwrap();
    let store = RecordStore::load(&config).unwrap();

    let first = build_training_set(store.employees(), date(2025, 1, 1), schema).unwrap();
    let second = build_training_set(store.employees(), date(2025, 1, 1), schema).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_scoring_sample_data() {
    let config = ConfigLoader::load(SAMPLE_CONFIG).unwrap();
    let schema = config.require_feature_schema().unwrap();
    let model = load_churn_model(&config).unwrap().unwrap();
    let store = RecordStore::load(&config).unwrap();

    let scores = score_employees(store.employees(), date(2025, 1, 1), schema, &model).unwrap();
    let top = top_at_risk(&scores, 5);

    assert_eq!(scores.len(), store.employees().len());
    assert!(scores.iter().all(|s| (0.0..=1.0).contains(&s.probability)));
    assert!(top.len() <= 5);
    assert!(top.iter().all(|s| s.still_employed));
    assert!(top.windows(2).all(|w| w[0].probability >= w[1].probability));
}

#[test]
fn test_model_for_other_schema_version_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigLoader::load(SAMPLE_CONFIG).unwrap();
    let model_path = config.churn_model_path().unwrap();
    let content = fs::read_to_string(model_path)
        .unwrap()
        .replace("churn-features-v1", "churn-features-v0");
    let path = dir.path().join("model.yaml");
    fs::write(&path, content).unwrap();

    let result = hr_kpi_engine::churn::LinearChurnModel::load(
        &path,
        config.require_feature_schema().unwrap(),
    );
    assert!(matches!(
        result,
        Err(EngineError::FeatureSchemaMismatch { .. })
    ));
}

// =============================================================================
// SECTION 4: Dashboard data API
// =============================================================================

fn create_sample_router() -> Router {
    let config = ConfigLoader::load(SAMPLE_CONFIG).expect("Failed to load config");
    let state = AppState::from_config(&config, date(2025, 1, 1)).expect("Failed to build state");
    create_router(state)
}

#[tokio::test]
async fn test_dashboard_metrics_match_aggregation() {
    let (status, body) = get_json(create_sample_router(), "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    let rows = body["rows"].as_array().unwrap();
    assert!(rows.len() >= 24);
    assert_eq!(rows[0]["month"], "2021-07-01");
}

#[tokio::test]
async fn test_dashboard_latest_month() {
    let (status, body) = get_json(create_sample_router(), "/metrics/latest").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["month"], "2024-12-01");
}

#[tokio::test]
async fn test_dashboard_absence_breakdowns() {
    let router = create_sample_router();

    let (status, by_type) = get_json(router.clone(), "/absences/by-type").await;
    assert_eq!(status, StatusCode::OK);
    let total: u64 = by_type
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["count"].as_u64().unwrap())
        .sum();
    let config = ConfigLoader::load(SAMPLE_CONFIG).unwrap();
    let store = RecordStore::load(&config).unwrap();
    assert_eq!(total as usize, store.absences().len());

    let (status, by_department) = get_json(router, "/absences/by-department").await;
    assert_eq!(status, StatusCode::OK);
    let departments: Vec<&str> = by_department
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["department"].as_str().unwrap())
        .collect();
    let mut sorted = departments.clone();
    sorted.sort();
    assert_eq!(departments, sorted);
}

#[tokio::test]
async fn test_dashboard_churn_endpoints() {
    let router = create_sample_router();

    let (status, top) = get_json(router.clone(), "/churn/top").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(top["schema_version"], "churn-features-v1");
    assert!(top["employees"].as_array().unwrap().len() <= 10);

    let (status, distribution) = get_json(router, "/churn/distribution?bins=10").await;
    assert_eq!(status, StatusCode::OK);
    let bins = distribution["bins"].as_array().unwrap();
    assert_eq!(bins.len(), 10);
    let counted: u64 = bins.iter().map(|b| b["count"].as_u64().unwrap()).sum();
    assert_eq!(counted, distribution["total"].as_u64().unwrap());
}

#[tokio::test]
async fn test_dashboard_serves_metrics_when_churn_cannot_score() {
    let config = ConfigLoader::load(SAMPLE_CONFIG).unwrap();
    // several sample employees are hired after this date
    let state = AppState::from_config(&config, date(2023, 1, 1)).unwrap();
    let router = create_router(state);

    let (status, metrics) = get_json(router.clone(), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(metrics["rows"][0]["month"], "2021-07-01");

    let (status, latest) = get_json(router.clone(), "/metrics/latest").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(latest["month"], "2024-12-01");

    let (status, _) = get_json(router.clone(), "/absences/by-department").await;
    assert_eq!(status, StatusCode::OK);

    let (_, health) = get_json(router.clone(), "/health").await;
    assert_eq!(health["churn_enabled"], false);

    let (status, top) = get_json(router, "/churn/top").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(top["code"], "CHURN_MODEL_UNAVAILABLE");
}

#[tokio::test]
async fn test_dashboard_serves_persisted_metrics_table() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(
        dir.path(),
        "1,Léa,Moreau,F,1992-03-08,RH,Paris,CDI,2024-01-10,2024-03-20,3100\n",
        "1,2024-02-01,2,Maladie\n1,2024-03-01,0,Autre\n",
        "",
    );
    let config = ConfigLoader::load(dir.path()).unwrap();
    let run = run_pipeline(&config, None).unwrap();

    let mut persisted = read_metrics_table(&run.metrics_path).unwrap();
    assert_eq!(persisted, run.report.rows);
    persisted[1].total_absent_days = 5;
    write_metrics_table(&persisted, &run.metrics_path).unwrap();

    let state = AppState::from_config(&config, date(2024, 6, 1)).unwrap();
    let (status, body) = get_json(create_router(state), "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1]["month"], "2024-02-01");
    assert_eq!(rows[1]["total_absent_days"], 5);
}

#[tokio::test]
async fn test_dashboard_unknown_route_is_404() {
    let response = create_sample_router()
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
