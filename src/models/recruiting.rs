//! Recruiting requisition model.
//!
//! A requisition contributes to the month its `close_date` falls in. Open
//! requisitions contribute to no month at all until they close.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::MonthBucket;

/// Status value recorded for requisitions that ended in a hire.
pub const DEFAULT_HIRED_STATUS: &str = "Hired";

/// A recruiting requisition and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruitingEvent {
    /// Unique identifier for the requisition.
    pub requisition_id: String,
    /// The date the requisition was opened.
    pub open_date: NaiveDate,
    /// The date the requisition was closed, if it is closed.
    pub close_date: Option<NaiveDate>,
    /// Terminal status (e.g., "Hired", "Closed-no-hire").
    pub status: String,
    /// Number of offers extended.
    pub offers_made: u32,
    /// Number of offers accepted.
    pub offers_accepted: u32,
    /// Days from opening to closing, as recorded by the source system.
    pub time_to_hire: Option<u32>,
    /// Recruiting spend attributed to the requisition.
    pub cost: Decimal,
}

impl RecruitingEvent {
    /// Checks the record's invariants.
    ///
    /// # Errors
    ///
    /// Returns `DataIntegrity` if the requisition closed before it opened or
    /// more offers were accepted than made.
    pub fn validate(&self) -> EngineResult<()> {
        if let Some(close_date) = self.close_date.filter(|d| *d < self.open_date) {
            return Err(EngineError::integrity(
                "requisition",
                &self.requisition_id,
                format!(
                    "close_date {} is before open_date {}",
                    close_date, self.open_date
                ),
            ));
        }

        if self.offers_accepted > self.offers_made {
            return Err(EngineError::integrity(
                "requisition",
                &self.requisition_id,
                format!(
                    "offers_accepted {} exceeds offers_made {}",
                    self.offers_accepted, self.offers_made
                ),
            ));
        }

        Ok(())
    }

    /// Returns true if the requisition has closed.
    pub fn is_closed(&self) -> bool {
        self.close_date.is_some()
    }

    /// Returns true if the requisition closed inside the bucket.
    pub fn closed_during(&self, bucket: &MonthBucket) -> bool {
        self.close_date
            .is_some_and(|close_date| bucket.contains_date(close_date))
    }

    /// Returns true if the requisition ended in a hire.
    pub fn is_hire(&self, hired_status: &str) -> bool {
        self.status == hired_status
    }

    /// Days from opening to closing.
    ///
    /// Prefers the recorded value and falls back to the date difference.
    /// Returns `None` for open requisitions.
    pub fn days_to_close(&self) -> Option<i64> {
        let close_date = self.close_date?;
        Some(
            self.time_to_hire
                .map(i64::from)
                .unwrap_or_else(|| (close_date - self.open_date).num_days()),
        )
    }
}
