#![warn(missing_docs)]
//! PQBench Core - Catalog, Invocation and Report Contract
//!
//! This crate holds everything that is known before a child process runs and
//! everything needed to read what it printed:
//! - `VariantCatalog` of families and their ordered parameter sets
//! - Invocation building with the positional and name-embedding prehash conventions
//! - `ReportParser` for the executables' free-text reports
//! - `StrategyTable` tying the three together per family

mod catalog;
mod command;
mod parser;
mod request;
mod strategy;

pub use catalog::{CatalogBuilder, Family, HashFamily, VariantCatalog, VariantSpec};
pub use command::{
    Invocation, PrehashConvention, build_arguments, prehash_digest, prehashed_invocation_name,
};
pub use parser::{
    ParseAnomaly, ParsedReport, ReportContract, ReportParser, SizeField, Stage, StageMetrics,
};
pub use request::{ExecutionRequest, PrehashMode};
pub use strategy::{FamilyOverrides, FamilyStrategy, StrategyTable};

use thiserror::Error;

/// Errors raised while resolving families, variants and invocations
#[derive(Debug, Error)]
pub enum CoreError {
    /// Family name not in the catalog
    #[error("Unknown family: {0}")]
    UnknownFamily(String),

    /// Variant name has no hash family or level to derive a prehash name from
    #[error("Variant {0} does not encode a hash family and security level")]
    NoPrehashName(String),

    /// A report contract label did not compile
    #[error("Invalid report pattern: {0}")]
    InvalidPattern(String),

    /// Family missing from the strategy table
    #[error("No strategy registered for family {0}")]
    MissingStrategy(Family),
}
