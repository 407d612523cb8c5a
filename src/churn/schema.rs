//! Versioned churn feature schema.
//!
//! The schema fixes the ordered list of model input columns: the numeric
//! features first, then one one-hot column per categorical level. Both the
//! feature builder and the model artifact are checked against it, so a
//! column can never be silently added, dropped or zero-filled.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::Employee;

/// A numeric model input derived from an employee record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericFeature {
    /// Monthly salary.
    Salary,
    /// Days from `hire_date` to `as_of`.
    TenureDays,
    /// Whole calendar years from `date_of_birth` to `as_of`.
    Age,
}

impl NumericFeature {
    /// Returns the column name used in the model and training set.
    pub fn name(self) -> &'static str {
        match self {
            NumericFeature::Salary => "salary",
            NumericFeature::TenureDays => "tenure_days",
            NumericFeature::Age => "age",
        }
    }
}

/// A categorical employee attribute that is one-hot encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalColumn {
    /// `Employee::gender`.
    Gender,
    /// `Employee::department`.
    Department,
    /// `Employee::site`.
    Site,
    /// `Employee::contract`.
    Contract,
}

impl CategoricalColumn {
    /// Every categorical column in encoding order.
    pub const ALL: [CategoricalColumn; 4] = [
        CategoricalColumn::Gender,
        CategoricalColumn::Department,
        CategoricalColumn::Site,
        CategoricalColumn::Contract,
    ];

    /// Returns the column name used as the one-hot prefix.
    pub fn name(self) -> &'static str {
        match self {
            CategoricalColumn::Gender => "gender",
            CategoricalColumn::Department => "department",
            CategoricalColumn::Site => "site",
            CategoricalColumn::Contract => "contract",
        }
    }

    /// Returns the employee's value for this column.
    pub fn value_of(self, employee: &Employee) -> &str {
        match self {
            CategoricalColumn::Gender => &employee.gender,
            CategoricalColumn::Department => &employee.department,
            CategoricalColumn::Site => &employee.site,
            CategoricalColumn::Contract => &employee.contract,
        }
    }
}

/// The known levels of every categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalLevels {
    /// Levels of `gender`.
    pub gender: Vec<String>,
    /// Levels of `department`.
    pub department: Vec<String>,
    /// Levels of `site`.
    pub site: Vec<String>,
    /// Levels of `contract`.
    pub contract: Vec<String>,
}

impl CategoricalLevels {
    /// Returns the levels of `column`, in encoding order.
    pub fn levels(&self, column: CategoricalColumn) -> &[String] {
        match column {
            CategoricalColumn::Gender => &self.gender,
            CategoricalColumn::Department => &self.department,
            CategoricalColumn::Site => &self.site,
            CategoricalColumn::Contract => &self.contract,
        }
    }
}

/// The versioned contract between feature engineering and the churn model.
///
/// # Example
///
/// ```
/// use hr_kpi_engine::churn::FeatureSchema;
///
/// let schema: FeatureSchema = serde_yaml::from_str(r#"
/// version: churn-features-v1
/// numeric: [salary, tenure_days, age]
/// categorical:
///   gender: [F, M]
///   department: [IT, RH]
///   site: [Lyon]
///   contract: [CDD, CDI]
/// drop_first: true
/// "#).unwrap();
///
/// assert_eq!(
///     schema.columns(),
///     vec!["salary", "tenure_days", "age", "gender_M", "department_RH", "contract_CDI"]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    /// Identifier the model artifact must match.
    pub version: String,
    /// Numeric features, in column order.
    #[serde(default = "default_numeric")]
    pub numeric: Vec<NumericFeature>,
    /// Known levels per categorical column.
    pub categorical: CategoricalLevels,
    /// Whether the first level of each categorical column is the implicit
    /// baseline and gets no column of its own.
    #[serde(default = "default_drop_first")]
    pub drop_first: bool,
}

fn default_numeric() -> Vec<NumericFeature> {
    vec![
        NumericFeature::Salary,
        NumericFeature::TenureDays,
        NumericFeature::Age,
    ]
}

fn default_drop_first() -> bool {
    true
}

impl FeatureSchema {
    /// Checks that the schema can encode every row unambiguously.
    ///
    /// # Errors
    ///
    /// Returns `FeatureSchemaMismatch` when the version is blank, a numeric
    /// feature is repeated, or a categorical column has no levels, a blank
    /// level or a repeated level.
    pub fn validate(&self) -> EngineResult<()> {
        if self.version.trim().is_empty() {
            return Err(mismatch("schema version must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        if let Some(duplicate) = self.numeric.iter().find(|f| !seen.insert(**f)) {
            return Err(mismatch(format!(
                "numeric feature '{}' listed twice",
                duplicate.name()
            )));
        }

        for column in CategoricalColumn::ALL {
            let levels = self.categorical.levels(column);
            if levels.is_empty() {
                return Err(mismatch(format!("'{}' has no levels", column.name())));
            }
            if levels.iter().any(|l| l.trim().is_empty()) {
                return Err(mismatch(format!("'{}' has a blank level", column.name())));
            }
            let mut seen = HashSet::new();
            if let Some(duplicate) = levels.iter().find(|l| !seen.insert(l.as_str())) {
                return Err(mismatch(format!(
                    "'{}' lists level '{}' twice",
                    column.name(),
                    duplicate
                )));
            }
        }

        Ok(())
    }

    /// Returns the ordered model input column names.
    pub fn columns(&self) -> Vec<String> {
        let numeric = self.numeric.iter().map(|f| f.name().to_string());
        let one_hot = CategoricalColumn::ALL.into_iter().flat_map(|column| {
            self.encoded_levels(column)
                .iter()
                .map(move |level| format!("{}_{}", column.name(), level))
        });
        numeric.chain(one_hot).collect()
    }

    /// One-hot encodes `value` for `column`.
    ///
    /// # Errors
    ///
    /// Returns `FeatureSchemaMismatch` when `value` is not a listed level.
    pub fn one_hot(&self, column: CategoricalColumn, value: &str) -> EngineResult<Vec<f64>> {
        if !self.categorical.levels(column).iter().any(|l| l == value) {
            return Err(mismatch(format!(
                "{} '{}' is not a level of schema '{}'",
                column.name(),
                value,
                self.version
            )));
        }

        Ok(self
            .encoded_levels(column)
            .iter()
            .map(|level| if level == value { 1.0 } else { 0.0 })
            .collect())
    }

    fn encoded_levels(&self, column: CategoricalColumn) -> &[String] {
        let levels = self.categorical.levels(column);
        if self.drop_first {
            levels.get(1..).unwrap_or_default()
        } else {
            levels
        }
    }
}

fn mismatch(message: String) -> EngineError {
    EngineError::FeatureSchemaMismatch { message }
}
