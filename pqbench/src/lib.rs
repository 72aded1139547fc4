#![warn(missing_docs)]
//! # PQBench
//!
//! Benchmark harness for external post-quantum signature executables.
//!
//! PQBench sweeps the parameter sets of three signature families, runs one
//! child process per (variant, prehash mode) and turns each free-text report
//! into a fixed 13-column row:
//! - **ML-DSA**: lattice-based, 3 parameter sets
//! - **XMSS**: stateful hash-based, 21 parameter sets
//! - **SLH-DSA**: stateless hash-based, 12 parameter sets, each run with and without prehash
//!
//! Every family ends up in its own `<FAMILY>_Resultados.csv`. Runs are strictly
//! sequential; a crashing, hanging or failing executable costs one row and one
//! tick of the failure counter, never the run.
//!
//! ## Quick Start
//!
//! ```text
//! $ pqbench 0 --bin-dir ./build --timeout 60s
//! $ pqbench 3 list
//! ```
//!
//! ## Library Use
//!
//! ```ignore
//! use pqbench::prelude::*;
//!
//! let catalog = VariantCatalog::builtin();
//! let strategies = StrategyTable::with_defaults(&catalog, Path::new("./build"))?;
//! let request = ExecutionRequest::new(catalog.variants(Family::SlhDsa)[0].clone(), Some(PrehashMode::Prehash));
//! println!("{}", strategies.build_command(&request)?);
//! ```

// Re-export core types
pub use pqbench_core::{
    CoreError, ExecutionRequest, Family, FamilyOverrides, FamilyStrategy, Invocation,
    ParseAnomaly, ParsedReport, PrehashConvention, PrehashMode, ReportContract, ReportParser,
    StrategyTable, VariantCatalog, VariantSpec, build_arguments, prehashed_invocation_name,
};

// Re-export report types
pub use pqbench_report::{
    FailureKind, FailureRecord, FamilySummary, HEADER, MeasuredRow, MetricRow, ReportError,
    ReportWriter, ResultSet, RunSummary,
};

// Re-export the harness
pub use pqbench_cli::{
    ChildProcessRunner, Cli, ExecutionOutcome, HarnessError, PqConfig, ProcessRunner,
    ResultAggregator, RunOptions, Selection, Sweeper, run, run_with_cli, sweep, sweep_catalog,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        ExecutionOutcome, ExecutionRequest, Family, PrehashMode, ProcessRunner, ResultAggregator,
        StrategyTable, VariantCatalog,
    };
    pub use std::path::Path;
}
