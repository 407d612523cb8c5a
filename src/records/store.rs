//! The validated, read-only record store.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::info;

use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{AbsenceRecord, Employee, RecruitingEvent};

use super::reader::{read_absences, read_employees, read_recruiting};

/// The three record sets a pipeline run works on.
///
/// A `RecordStore` can only be built from records that satisfy their
/// invariants, so the aggregation never sees a leave before a hire, a
/// requisition closing before it opened, or two employees sharing an id.
/// The store is immutable once built.
#[derive(Debug, Clone)]
pub struct RecordStore {
    employees: Vec<Employee>,
    absences: Vec<AbsenceRecord>,
    recruiting: Vec<RecruitingEvent>,
    employee_index: HashMap<String, usize>,
}

impl RecordStore {
    /// Builds a store from already-parsed records.
    ///
    /// # Errors
    ///
    /// Returns `DataIntegrity` for the first record that violates an
    /// invariant, or for a duplicated employee or requisition id.
    pub fn new(
        employees: Vec<Employee>,
        absences: Vec<AbsenceRecord>,
        recruiting: Vec<RecruitingEvent>,
    ) -> EngineResult<Self> {
        let mut employee_index = HashMap::with_capacity(employees.len());
        for (position, employee) in employees.iter().enumerate() {
            employee.validate()?;
            if employee_index.insert(employee.id.clone(), position).is_some() {
                return Err(EngineError::integrity(
                    "employee",
                    &employee.id,
                    "duplicate employee id",
                ));
            }
        }

        let mut requisition_ids = HashSet::with_capacity(recruiting.len());
        for event in &recruiting {
            event.validate()?;
            if !requisition_ids.insert(event.requisition_id.as_str()) {
                return Err(EngineError::integrity(
                    "requisition",
                    &event.requisition_id,
                    "duplicate requisition id",
                ));
            }
        }

        Ok(Self {
            employees,
            absences,
            recruiting,
            employee_index,
        })
    }

    /// Loads and validates the record sets named by the configuration.
    pub fn load(config: &ConfigLoader) -> EngineResult<Self> {
        Self::load_from_paths(
            &config.employees_path(),
            &config.absences_path(),
            &config.recruiting_path(),
        )
    }

    /// Loads and validates the record sets from explicit paths.
    ///
    /// All three files are checked for existence before any is read, so a
    /// missing input fails the run before any work is done.
    pub fn load_from_paths(
        employees_path: &Path,
        absences_path: &Path,
        recruiting_path: &Path,
    ) -> EngineResult<Self> {
        if let Some(missing) = [employees_path, absences_path, recruiting_path]
            .into_iter()
            .find(|path| !path.is_file())
        {
            return Err(EngineError::MissingFile {
                path: missing.display().to_string(),
            });
        }

        let store = Self::new(
            read_employees(employees_path)?,
            read_absences(absences_path)?,
            read_recruiting(recruiting_path)?,
        )?;

        info!(
            employees = store.employees.len(),
            absences = store.absences.len(),
            requisitions = store.recruiting.len(),
            "Loaded record store"
        );

        Ok(store)
    }

    /// Returns all employees.
    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    /// Returns all absence records.
    pub fn absences(&self) -> &[AbsenceRecord] {
        &self.absences
    }

    /// Returns all recruiting requisitions.
    pub fn recruiting(&self) -> &[RecruitingEvent] {
        &self.recruiting
    }

    /// Looks up an employee by id.
    pub fn employee(&self, id: &str) -> Option<&Employee> {
        self.employee_index
            .get(id)
            .map(|&position| &self.employees[position])
    }

    /// Absence records that reference no known employee.
    pub fn orphan_absences(&self) -> impl Iterator<Item = &AbsenceRecord> {
        self.absences
            .iter()
            .filter(|absence| !self.employee_index.contains_key(&absence.employee_id))
    }
}
