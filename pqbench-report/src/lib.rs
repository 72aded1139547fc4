#![warn(missing_docs)]
//! PQBench Report - Rows, Tables and Summaries
//!
//! Holds the data produced by a sweep and the formats it leaves the process in:
//! - `MeasuredRow` / `MetricRow` / `ResultSet` (13 fixed columns per row)
//! - CSV (one family-named file per family)
//! - JSON run summary (machine-readable)

mod csv;
mod json;
mod report;
mod row;

pub use self::csv::{DEFAULT_SUFFIX, ReportError, ReportWriter};
pub use json::generate_json_summary;
pub use report::{FailureKind, FailureRecord, FamilySummary, RunMeta, RunSummary, SystemInfo};
pub use row::{HEADER, MeasuredRow, MetricRow, ResultSet};
