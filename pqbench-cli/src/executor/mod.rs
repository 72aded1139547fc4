//! Sweep Executor
//!
//! Runs planned requests against the signature executables and collects
//! their rows.
//!
//! ## Pipeline Overview
//!
//! ```text
//! ExecutionPlan (from planner)
//!       │
//!       ▼
//! ┌─────────────┐
//! │  execution  │  Invoke each request, classify, parse
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ aggregator  │  Rows per family, totals, failure counter
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Human-readable output
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`execution`] - Sequential sweep over a family-keyed strategy table
//! - [`aggregator`] - Result sets and the failure counter
//! - [`formatting`] - Human-readable output formatting
//! - [`metadata`] - System metadata collection

mod aggregator;
mod execution;
mod formatting;
mod metadata;

// Re-export public API
pub use aggregator::ResultAggregator;
pub use execution::{SweepConfig, Sweeper};
pub use formatting::{format_human_output, format_plan};
pub use metadata::build_run_meta;
