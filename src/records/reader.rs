//! CSV readers for the three input record sets.
//!
//! Rows are deserialized into raw string rows first and then parsed field by
//! field, so that a bad value surfaces as a `DataIntegrity` error naming the
//! record rather than as an anonymous CSV error.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{AbsenceRecord, Employee, RecruitingEvent};

use super::parse::FieldContext;

#[derive(Debug, Deserialize)]
struct EmployeeRow {
    #[serde(alias = "id")]
    emp_id: String,
    first_name: String,
    last_name: String,
    gender: String,
    dob: String,
    department: String,
    site: String,
    contract: String,
    hire_date: String,
    #[serde(default)]
    leave_date: Option<String>,
    salary: String,
}

#[derive(Debug, Deserialize)]
struct AbsenceRow {
    #[serde(alias = "employee_id")]
    emp_id: String,
    month: String,
    absent_days: String,
    absence_type: String,
}

#[derive(Debug, Deserialize)]
struct RecruitingRow {
    #[serde(alias = "requisition_id")]
    req_id: String,
    open_date: String,
    #[serde(default)]
    close_date: Option<String>,
    status: String,
    offers_made: String,
    offers_accepted: String,
    #[serde(default)]
    time_to_hire: Option<String>,
    cost: String,
}

/// Reads the employees file.
///
/// # Errors
///
/// - `MissingFile` if the file does not exist
/// - `MalformedFile` if the CSV structure is invalid
/// - `DataIntegrity` if a field cannot be parsed
pub fn read_employees(path: &Path) -> EngineResult<Vec<Employee>> {
    parse_employees(open(path)?, &path.display().to_string())
}

/// Reads the absences file.
pub fn read_absences(path: &Path) -> EngineResult<Vec<AbsenceRecord>> {
    parse_absences(open(path)?, &path.display().to_string())
}

/// Reads the recruiting file.
pub fn read_recruiting(path: &Path) -> EngineResult<Vec<RecruitingEvent>> {
    parse_recruiting(open(path)?, &path.display().to_string())
}

fn open(path: &Path) -> EngineResult<File> {
    File::open(path).map_err(|_| EngineError::MissingFile {
        path: path.display().to_string(),
    })
}

/// Deserializes every row of `reader` into `Row` and converts it with `convert`.
fn parse_rows<R, Row, T, F>(reader: R, source: &str, convert: F) -> EngineResult<Vec<T>>
where
    R: Read,
    Row: for<'de> Deserialize<'de>,
    F: Fn(Row, usize) -> EngineResult<T>,
{
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let records = csv_reader
        .deserialize::<Row>()
        .enumerate()
        .map(|(index, row)| {
            // header is line 1
            let line = index + 2;
            let row = row.map_err(|e| EngineError::MalformedFile {
                path: source.to_string(),
                message: e.to_string(),
            })?;
            convert(row, line)
        })
        .collect::<EngineResult<Vec<T>>>()?;

    debug!(source, rows = records.len(), "Parsed input file");
    Ok(records)
}

fn row_key(id: &str, line: usize) -> String {
    if id.trim().is_empty() {
        format!("line {}", line)
    } else {
        id.trim().to_string()
    }
}

/// Parses employee rows from any reader.
pub fn parse_employees<R: Read>(reader: R, source: &str) -> EngineResult<Vec<Employee>> {
    parse_rows(reader, source, |row: EmployeeRow, line| {
        let key = row_key(&row.emp_id, line);
        let ctx = FieldContext::new("employee", &key);

        Ok(Employee {
            id: ctx.text("emp_id", &row.emp_id)?,
            first_name: row.first_name,
            last_name: row.last_name,
            gender: ctx.text("gender", &row.gender)?,
            date_of_birth: ctx.date("dob", &row.dob)?,
            department: ctx.text("department", &row.department)?,
            site: ctx.text("site", &row.site)?,
            contract: ctx.text("contract", &row.contract)?,
            salary: ctx.amount("salary", &row.salary)?,
            hire_date: ctx.date("hire_date", &row.hire_date)?,
            leave_date: ctx.optional_date("leave_date", row.leave_date.as_deref())?,
        })
    })
}

/// Parses absence rows from any reader.
pub fn parse_absences<R: Read>(reader: R, source: &str) -> EngineResult<Vec<AbsenceRecord>> {
    parse_rows(reader, source, |row: AbsenceRow, line| {
        let key = format!("{}@{}", row_key(&row.emp_id, line), row.month);
        let ctx = FieldContext::new("absence", &key);

        Ok(AbsenceRecord {
            employee_id: ctx.text("emp_id", &row.emp_id)?,
            month: ctx.date("month", &row.month)?,
            absent_days: ctx.count("absent_days", &row.absent_days)?,
            absence_type: ctx.text("absence_type", &row.absence_type)?,
        })
    })
}

/// Parses recruiting rows from any reader.
pub fn parse_recruiting<R: Read>(reader: R, source: &str) -> EngineResult<Vec<RecruitingEvent>> {
    parse_rows(reader, source, |row: RecruitingRow, line| {
        let key = row_key(&row.req_id, line);
        let ctx = FieldContext::new("requisition", &key);

        Ok(RecruitingEvent {
            requisition_id: ctx.text("req_id", &row.req_id)?,
            open_date: ctx.date("open_date", &row.open_date)?,
            close_date: ctx.optional_date("close_date", row.close_date.as_deref())?,
            status: ctx.text("status", &row.status)?,
            offers_made: ctx.count("offers_made", &row.offers_made)?,
            offers_accepted: ctx.count("offers_accepted", &row.offers_accepted)?,
            time_to_hire: ctx.optional_count("time_to_hire", row.time_to_hire.as_deref())?,
            cost: ctx.amount("cost", &row.cost)?,
        })
    })
}
