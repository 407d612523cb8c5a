//! Monthly metrics table output, and reading it back for the dashboard.

use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::MonthlyMetrics;
use crate::records::FieldContext;

use super::atomic::write_csv_atomically;

/// Column order of the metrics table file.
pub const METRICS_COLUMNS: [&str; 10] = [
    "month",
    "active_count",
    "hires",
    "leaves",
    "turnover",
    "total_absent_days",
    "absenteeism_rate",
    "recruit_hires",
    "time_to_hire",
    "cost_per_hire",
];

/// Writes the metrics table to `path`, replacing any previous file.
///
/// The header is always written, even for an empty table. Undefined
/// values are written as empty fields.
pub fn write_metrics_table(rows: &[MonthlyMetrics], path: &Path) -> EngineResult<()> {
    write_csv_atomically(path, |writer| {
        writer.write_record(METRICS_COLUMNS)?;
        for row in rows {
            writer.serialize(row)?;
        }
        Ok(())
    })?;

    info!(path = %path.display(), rows = rows.len(), "Wrote metrics table");
    Ok(())
}

#[derive(Debug, Deserialize)]
struct MetricsRow {
    month: String,
    active_count: String,
    hires: String,
    leaves: String,
    turnover: String,
    total_absent_days: String,
    absenteeism_rate: String,
    recruit_hires: String,
    #[serde(default)]
    time_to_hire: Option<String>,
    #[serde(default)]
    cost_per_hire: Option<String>,
}

impl MetricsRow {
    fn parse(self, line: usize) -> EngineResult<MonthlyMetrics> {
        let key = if self.month.trim().is_empty() {
            format!("line {}", line)
        } else {
            self.month.trim().to_string()
        };
        let ctx = FieldContext::new("metrics_row", &key);

        Ok(MonthlyMetrics {
            month: ctx.date("month", &self.month)?,
            active_count: ctx.count("active_count", &self.active_count)? as usize,
            hires: ctx.count("hires", &self.hires)? as usize,
            leaves: ctx.count("leaves", &self.leaves)? as usize,
            turnover: ctx.amount("turnover", &self.turnover)?,
            total_absent_days: u64::from(ctx.count("total_absent_days", &self.total_absent_days)?),
            absenteeism_rate: ctx.amount("absenteeism_rate", &self.absenteeism_rate)?,
            recruit_hires: ctx.count("recruit_hires", &self.recruit_hires)? as usize,
            time_to_hire: ctx.optional_amount("time_to_hire", self.time_to_hire.as_deref())?,
            cost_per_hire: ctx.optional_amount("cost_per_hire", self.cost_per_hire.as_deref())?,
        })
    }
}

/// Reads a metrics table previously written by [`write_metrics_table`].
///
/// # Errors
///
/// - `MissingFile` if `path` does not exist
/// - `MalformedFile` if the header is not exactly [`METRICS_COLUMNS`] or a
///   row has the wrong shape
/// - `DataIntegrity` if a value cannot be parsed, or months are not
///   strictly ascending
pub fn read_metrics_table(path: &Path) -> EngineResult<Vec<MonthlyMetrics>> {
    let path_str = path.display().to_string();
    let malformed = |message: String| EngineError::MalformedFile {
        path: path_str.clone(),
        message,
    };

    let file = File::open(path).map_err(|_| EngineError::MissingFile {
        path: path_str.clone(),
    })?;
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(file);

    let header = reader.headers().map_err(|e| malformed(e.to_string()))?;
    if !header.iter().eq(METRICS_COLUMNS) {
        return Err(malformed(format!(
            "expected columns [{}], found [{}]",
            METRICS_COLUMNS.join(", "),
            header.iter().collect::<Vec<_>>().join(", ")
        )));
    }

    let rows = reader
        .deserialize::<MetricsRow>()
        .enumerate()
        .map(|(index, row)| {
            // header is line 1
            row.map_err(|e| malformed(e.to_string()))?.parse(index + 2)
        })
        .collect::<EngineResult<Vec<_>>>()?;

    if let Some(pair) = rows.windows(2).find(|pair| pair[0].month >= pair[1].month) {
        return Err(EngineError::integrity(
            "metrics_row",
            pair[1].month.to_string(),
            format!("month follows {} out of order", pair[0].month),
        ));
    }

    info!(path = %path_str, rows = rows.len(), "Read metrics table");
    Ok(rows)
}
