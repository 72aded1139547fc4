//! Run Summary Data Structures

use chrono::{DateTime, Utc};
use pqbench_core::Family;
use serde::{Deserialize, Serialize};

/// Summary of a whole harness run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// When, where and how the run happened
    pub meta: RunMeta,
    /// One entry per swept family, in sweep order
    pub families: Vec<FamilySummary>,
    /// Final value of the failure counter
    pub failures: u64,
}

/// Run metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    /// Harness version
    pub version: String,
    /// Start of the run
    pub timestamp: DateTime<Utc>,
    /// Host description
    pub system: SystemInfo,
    /// Per-invocation timeout
    pub timeout_secs: f64,
}

/// Host the run was measured on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system
    pub os: String,
    /// CPU architecture
    pub arch: String,
    /// CPU model name
    pub cpu: String,
    /// Logical cores
    pub cpu_cores: u32,
}

/// Outcome of one family's sweep and export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilySummary {
    /// Swept family
    pub family: Family,
    /// Rows in the exported set
    pub rows: usize,
    /// Written CSV file, absent when the export failed
    pub report_file: Option<String>,
    /// Why the export failed, if it did
    pub export_error: Option<String>,
    /// Failures counted for this family
    pub failures: Vec<FailureRecord>,
}

/// Why a request counted as a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// Executable exited with a non-zero status or a signal
    NonZeroExit,
    /// Killed after the timeout
    TimedOut,
    /// Executable could not be started
    LaunchFailed,
    /// Report carried the verification-failure marker
    VerificationFailed,
}

impl FailureKind {
    /// Short label for terminal output
    pub fn label(self) -> &'static str {
        match self {
            FailureKind::NonZeroExit => "exit",
            FailureKind::TimedOut => "timeout",
            FailureKind::LaunchFailed => "launch",
            FailureKind::VerificationFailed => "verification",
        }
    }
}

/// One counted failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Variant name
    pub variant: String,
    /// `Sí` / `No`
    pub prehash: String,
    /// How it failed
    pub kind: FailureKind,
    /// Exit code, stderr excerpt or launch error
    pub detail: Option<String>,
}
