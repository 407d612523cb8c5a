//! Churn feature engineering.
//!
//! Turns employee records into model inputs laid out by a [`FeatureSchema`].
//! Tenure and age are always measured against an explicit `as_of` date so
//! that the same records and date always yield the same features.

use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::Employee;
use crate::output::write_csv_atomically;

use super::schema::{CategoricalColumn, FeatureSchema, NumericFeature};

/// Model inputs for one employee, ordered as `FeatureSchema::columns`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    /// The employee the features describe.
    pub employee_id: String,
    /// Version of the schema the vector was built against.
    pub schema_version: String,
    /// Feature values.
    pub values: Vec<f64>,
}

/// A feature row with its attrition label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingRow {
    /// The employee's features.
    pub features: FeatureVector,
    /// Whether the employee has a `leave_date`.
    pub left: bool,
}

/// Labelled feature rows for an external trainer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingSet {
    /// Version of the schema the rows were built against.
    pub schema_version: String,
    /// The reference date tenure and age were measured against.
    pub as_of: NaiveDate,
    /// Column names, in value order.
    pub columns: Vec<String>,
    /// One row per employee, in input order.
    pub rows: Vec<TrainingRow>,
}

impl TrainingSet {
    /// Number of rows labelled as having left.
    pub fn leavers(&self) -> usize {
        self.rows.iter().filter(|r| r.left).count()
    }
}

/// Builds the feature vector for one employee.
///
/// # Errors
///
/// - `DataIntegrity` if `hire_date` or `date_of_birth` is after `as_of`
/// - `FeatureSchemaMismatch` if a categorical value is not a schema level
/// - `CalculationError` if the salary cannot be represented as a float
pub fn build_feature_vector(
    employee: &Employee,
    as_of: NaiveDate,
    schema: &FeatureSchema,
) -> EngineResult<FeatureVector> {
    if employee.hire_date > as_of {
        return Err(EngineError::integrity(
            "employee",
            &employee.id,
            format!("hire_date {} is after as_of {}", employee.hire_date, as_of),
        ));
    }
    let age = as_of.years_since(employee.date_of_birth).ok_or_else(|| {
        EngineError::integrity(
            "employee",
            &employee.id,
            format!("dob {} is after as_of {}", employee.date_of_birth, as_of),
        )
    })?;
    let tenure_days = (as_of - employee.hire_date).num_days();
    let salary = employee
        .salary
        .to_f64()
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("salary of employee '{}' is out of range", employee.id),
        })?;

    let mut values: Vec<f64> = schema
        .numeric
        .iter()
        .map(|feature| match feature {
            NumericFeature::Salary => salary,
            NumericFeature::TenureDays => tenure_days as f64,
            NumericFeature::Age => f64::from(age),
        })
        .collect();

    for column in CategoricalColumn::ALL {
        let encoded = schema
            .one_hot(column, column.value_of(employee))
            .map_err(|e| match e {
                EngineError::FeatureSchemaMismatch { message } => {
                    EngineError::FeatureSchemaMismatch {
                        message: format!("employee '{}': {}", employee.id, message),
                    }
                }
                other => other,
            })?;
        values.extend(encoded);
    }

    Ok(FeatureVector {
        employee_id: employee.id.clone(),
        schema_version: schema.version.clone(),
        values,
    })
}

/// Builds labelled feature rows for every employee.
///
/// Fails on the first employee that cannot be encoded; no partial set is
/// returned.
pub fn build_training_set(
    employees: &[Employee],
    as_of: NaiveDate,
    schema: &FeatureSchema,
) -> EngineResult<TrainingSet> {
    let rows = employees
        .iter()
        .map(|employee| {
            Ok(TrainingRow {
                features: build_feature_vector(employee, as_of, schema)?,
                left: employee.has_left(),
            })
        })
        .collect::<EngineResult<Vec<_>>>()?;

    Ok(TrainingSet {
        schema_version: schema.version.clone(),
        as_of,
        columns: schema.columns(),
        rows,
    })
}

/// Writes a training set as CSV: `emp_id`, every schema column, `left`.
///
/// The label is written as `1`/`0`.
pub fn write_training_set(set: &TrainingSet, path: &Path) -> EngineResult<()> {
    let header = std::iter::once("emp_id")
        .chain(set.columns.iter().map(String::as_str))
        .chain(std::iter::once("left"));

    write_csv_atomically(path, |writer| {
        writer.write_record(header)?;
        for row in &set.rows {
            let values = row.features.values.iter().map(|v| v.to_string());
            let record = std::iter::once(row.features.employee_id.clone())
                .chain(values)
                .chain(std::iter::once(if row.left { "1" } else { "0" }.to_string()));
            writer.write_record(record)?;
        }
        Ok(())
    })?;

    info!(
        path = %path.display(),
        rows = set.rows.len(),
        leavers = set.leavers(),
        schema_version = %set.schema_version,
        "Wrote churn training set"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::churn::CategoricalLevels;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_schema() -> FeatureSchema {
        FeatureSchema {
            version: "test-v1".to_string(),
            numeric: vec![
                NumericFeature::Salary,
                NumericFeature::TenureDays,
                NumericFeature::Age,
            ],
            categorical: CategoricalLevels {
                gender: vec!["F".to_string(), "M".to_string()],
                department: vec!["IT".to_string(), "RH".to_string()],
                site: vec!["Lyon".to_string(), "Paris".to_string()],
                contract: vec!["CDD".to_string(), "CDI".to_string()],
            },
            drop_first: true,
        }
    }

    fn create_employee(id: &str) -> Employee {
        Employee {
            id: id.to_string(),
            first_name: "Inès".to_string(),
            last_name: "Garnier".to_string(),
            gender: "M".to_string(),
            date_of_birth: date(1990, 6, 15),
            department: "RH".to_string(),
            site: "Lyon".to_string(),
            contract: "CDI".to_string(),
            salary: Decimal::new(325050, 2),
            hire_date: date(2020, 1, 1),
            leave_date: None,
        }
    }

    #[test]
    fn test_feature_vector_layout() {
        let schema = create_schema();
        let employee = create_employee("7");

        let vector = build_feature_vector(&employee, date(2021, 1, 1), &schema).unwrap();

        assert_eq!(vector.employee_id, "7");
        assert_eq!(vector.schema_version, "test-v1");
        assert_eq!(vector.values.len(), schema.columns().len());
        // salary, tenure (2020 is a leap year), age, gender_M, department_RH, site_Paris, contract_CDI
        assert_eq!(
            vector.values,
            vec![3250.5, 366.0, 30.0, 1.0, 1.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_age_counts_whole_years_only() {
        let schema = create_schema();
        let employee = create_employee("7");

        let before_birthday = build_feature_vector(&employee, date(2024, 6, 14), &schema).unwrap();
        let on_birthday = build_feature_vector(&employee, date(2024, 6, 15), &schema).unwrap();

        assert_eq!(before_birthday.values[2], 33.0);
        assert_eq!(on_birthday.values[2], 34.0);
    }

    #[test]
    fn test_same_as_of_gives_identical_features() {
        let schema = create_schema();
        let employee = create_employee("7");

        let first = build_feature_vector(&employee, date(2024, 3, 1), &schema).unwrap();
        let second = build_feature_vector(&employee, date(2024, 3, 1), &schema).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_category_fails() {
        let schema = create_schema();
        let mut employee = create_employee("7");
        employee.department = "Legal".to_string();

        match build_feature_vector(&employee, date(2024, 3, 1), &schema) {
            Err(EngineError::FeatureSchemaMismatch { message }) => {
                assert!(message.contains("employee '7'"));
                assert!(message.contains("Legal"));
            }
            other => panic!("Expected FeatureSchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_hire_after_as_of_fails() {
        let schema = create_schema();
        let employee = create_employee("7");

        let result = build_feature_vector(&employee, date(2019, 12, 31), &schema);
        assert!(matches!(result, Err(EngineError::DataIntegrity { .. })));
    }

    #[test]
    fn test_birth_after_as_of_fails() {
        let schema = create_schema();
        let mut employee = create_employee("7");
        employee.date_of_birth = date(2025, 1, 1);

        let result = build_feature_vector(&employee, date(2024, 3, 1), &schema);
        match result {
            Err(EngineError::DataIntegrity { rule, .. }) => assert!(rule.contains("dob")),
            other => panic!("Expected DataIntegrity, got {:?}", other),
        }
    }

    #[test]
    fn test_training_set_labels_leavers() {
        let schema = create_schema();
        let mut leaver = create_employee("2");
        leaver.leave_date = Some(date(2023, 5, 31));
        let employees = vec![create_employee("1"), leaver];

        let set = build_training_set(&employees, date(2024, 1, 1), &schema).unwrap();

        assert_eq!(set.rows.len(), 2);
        assert!(!set.rows[0].left);
        assert!(set.rows[1].left);
        assert_eq!(set.leavers(), 1);
        assert_eq!(set.columns, schema.columns());
    }

    #[test]
    fn test_write_training_set_csv_layout() {
        let schema = create_schema();
        let set = build_training_set(&[create_employee("1")], date(2021, 1, 1), &schema).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("training.csv");

        write_training_set(&set, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "emp_id,salary,tenure_days,age,gender_M,department_RH,site_Paris,contract_CDI,left"
        );
        assert_eq!(lines.next().unwrap(), "1,3250.5,366,30,1,1,0,1,0");
        assert!(lines.next().is_none());
    }
}
