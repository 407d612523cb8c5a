//! Field parsers shared by the CSV readers.
//!
//! Every parser reports failures as `DataIntegrity` carrying the record kind,
//! the record's identifying key and the offending field.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{EngineError, EngineResult};

/// ISO calendar date format used by every input file.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Identifies the record a field belongs to.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    /// Record kind (e.g., "employee").
    pub record: &'a str,
    /// Identifying key of the record.
    pub key: &'a str,
}

impl<'a> FieldContext<'a> {
    /// Creates a context for the given record kind and key.
    pub fn new(record: &'a str, key: &'a str) -> Self {
        Self { record, key }
    }

    fn violation(&self, field: &str, rule: impl AsRef<str>) -> EngineError {
        EngineError::integrity(self.record, self.key, format!("{}: {}", field, rule.as_ref()))
    }

    /// Parses a required ISO date.
    pub fn date(&self, field: &str, value: &str) -> EngineResult<NaiveDate> {
        let value = value.trim();
        if value.is_empty() {
            return Err(self.violation(field, "is required"));
        }
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map_err(|_| self.violation(field, format!("'{}' is not a valid date", value)))
    }

    /// Parses an optional ISO date; an empty field is `None`.
    pub fn optional_date(&self, field: &str, value: Option<&str>) -> EngineResult<Option<NaiveDate>> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => self.date(field, v).map(Some),
            None => Ok(None),
        }
    }

    /// Parses a non-negative whole number.
    ///
    /// Accepts a trailing `.0` as written by tools that store integer
    /// columns as floats.
    pub fn count(&self, field: &str, value: &str) -> EngineResult<u32> {
        let value = value.trim();
        let number = Decimal::from_str(value)
            .map_err(|_| self.violation(field, format!("'{}' is not a number", value)))?;

        if number.is_sign_negative() && !number.is_zero() {
            return Err(self.violation(field, format!("{} must be non-negative", value)));
        }
        if !number.fract().is_zero() {
            return Err(self.violation(field, format!("{} is not a whole number", value)));
        }

        number
            .to_u32()
            .ok_or_else(|| self.violation(field, format!("{} is out of range", value)))
    }

    /// Parses an optional non-negative whole number; an empty field is `None`.
    pub fn optional_count(&self, field: &str, value: Option<&str>) -> EngineResult<Option<u32>> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => self.count(field, v).map(Some),
            None => Ok(None),
        }
    }

    /// Parses a non-negative monetary amount.
    pub fn amount(&self, field: &str, value: &str) -> EngineResult<Decimal> {
        let value = value.trim();
        let amount = Decimal::from_str(value)
            .map_err(|_| self.violation(field, format!("'{}' is not a number", value)))?;

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(self.violation(field, format!("{} must be non-negative", value)));
        }
        Ok(amount)
    }

    /// Parses an optional non-negative amount; an empty field is `None`.
    pub fn optional_amount(&self, field: &str, value: Option<&str>) -> EngineResult<Option<Decimal>> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => self.amount(field, v).map(Some),
            None => Ok(None),
        }
    }

    /// Returns a required, non-empty text field.
    pub fn text(&self, field: &str, value: &str) -> EngineResult<String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(self.violation(field, "is required"));
        }
        Ok(value.to_string())
    }
}
