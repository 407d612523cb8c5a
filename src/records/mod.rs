//! The HR record store.
//!
//! This module reads the employees, absences and recruiting CSV files,
//! parses every field into typed records, and checks record invariants
//! before anything is aggregated.

mod parse;
mod reader;
mod store;

pub use parse::{DATE_FORMAT, FieldContext};
pub use reader::{
    parse_absences, parse_employees, parse_recruiting, read_absences, read_employees,
    read_recruiting,
};
pub use store::RecordStore;
