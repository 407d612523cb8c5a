//! Tabular file output.
//!
//! Every file this crate produces is written atomically: a sibling temp file
//! is written in full and then renamed over the destination. The metrics
//! table can also be read back for serving.

mod atomic;
mod metrics_table;

pub use atomic::write_csv_atomically;
pub use metrics_table::{METRICS_COLUMNS, read_metrics_table, write_metrics_table};
