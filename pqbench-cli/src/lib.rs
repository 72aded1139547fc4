#![warn(missing_docs)]
//! PQBench CLI Library
//!
//! Command-line front end of the harness: family selection, configuration
//! layering, the sequential sweep and its outputs.
//!
//! # Example
//!
//! ```ignore
//! fn main() {
//!     if let Err(e) = pqbench_cli::run() {
//!         eprintln!("{}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

mod config;
mod executor;
mod menu;
mod planner;
mod supervisor;

pub use config::*;
pub use executor::{
    ResultAggregator, SweepConfig, Sweeper, build_run_meta, format_human_output, format_plan,
};
pub use menu::{Selection, prompt};
pub use planner::{ExecutionPlan, FamilyPlan, build_plan};
pub use supervisor::*;

use clap::{Parser, Subcommand};
use pqbench_core::{
    CoreError, Family, FamilyOverrides, PrehashConvention, ReportContract, StrategyTable,
    VariantCatalog,
};
use pqbench_report::{ReportWriter, RunSummary, generate_json_summary};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that end a run before or after the sweep
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Menu answer outside `0`..`3`
    #[error("Introduce únicamente el número [0,1,2,3].")]
    InvalidSelection(String),

    /// `--filter` is not a valid regex
    #[error("Invalid filter: {0}")]
    InvalidFilter(#[from] regex::Error),

    /// Catalog or strategy setup failed
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Terminal or summary I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `--strict` run ended with a non-zero failure counter
    #[error("{0} failure(s) recorded")]
    FailuresRecorded(u64),
}

/// PQBench CLI arguments
#[derive(Parser, Debug, Default)]
#[command(name = "pqbench")]
#[command(
    author,
    version,
    about = "PQBench - benchmark harness for post-quantum signature executables"
)]
pub struct Cli {
    /// Optional subcommand (Run, List, Config); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Family selection: 0 = all, 1 = ML-DSA, 2 = XMSS, 3 = SLH-DSA.
    /// Prompted on stdin when omitted.
    pub selection: Option<String>,

    /// Only run variants whose name matches this regex
    #[arg(long)]
    pub filter: Option<String>,

    /// Dry run - list requests and their command lines without executing
    #[arg(long)]
    pub dry_run: bool,

    /// Configuration file (default: discover pqbench.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding the family executables
    #[arg(long)]
    pub bin_dir: Option<PathBuf>,

    /// Directory for the CSV files
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Per-invocation timeout (e.g., "60s", "500ms")
    #[arg(long)]
    pub timeout: Option<String>,

    /// Prehash convention: positional or name-embedding
    #[arg(long)]
    pub prehash_convention: Option<PrehashConvention>,

    /// Write a JSON run summary to this path
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Exit with status 1 when any failure was recorded
    #[arg(long)]
    pub strict: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Run the sweep (default)
    Run,
    /// List planned requests and their command lines
    List,
    /// Print a default pqbench.toml
    Config,
}

/// Everything a sweep needs, after layering configuration and CLI flags
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Families in sweep order
    pub families: Vec<Family>,
    /// Directory holding the executables
    pub bin_dir: PathBuf,
    /// Directory for the CSV files
    pub output_dir: PathBuf,
    /// CSV file-name suffix
    pub suffix: String,
    /// Per-invocation timeout
    pub timeout: Duration,
    /// SIGTERM to SIGKILL wait
    pub grace_period: Duration,
    /// Default prehash convention
    pub convention: PrehashConvention,
    /// Per-family executable and convention overrides
    pub overrides: BTreeMap<Family, FamilyOverrides>,
    /// Report text contract
    pub contract: ReportContract,
    /// Row handling on the verification-failure marker
    pub verification: VerificationPolicy,
    /// Variant-name filter
    pub filter: Option<Regex>,
    /// Draw progress bars
    pub progress: bool,
}

impl RunOptions {
    /// Layer CLI flags over `config` for the given families
    pub fn resolve(cli: &Cli, config: &PqConfig, families: Vec<Family>) -> anyhow::Result<Self> {
        let timeout = PqConfig::duration(cli.timeout.as_deref().unwrap_or(&config.runner.timeout))?;
        let grace_period = PqConfig::duration(&config.runner.grace_period)?;
        let filter = cli
            .filter
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(HarnessError::from)?;

        Ok(Self {
            families,
            bin_dir: cli
                .bin_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.runner.bin_dir)),
            output_dir: cli
                .output_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.output.directory)),
            suffix: config.output.suffix.clone(),
            timeout,
            grace_period,
            convention: cli
                .prehash_convention
                .unwrap_or(config.runner.prehash_convention),
            overrides: config.family_overrides(),
            contract: config.report.clone(),
            verification: config.verification.policy,
            filter,
            progress: true,
        })
    }

    /// Strategy table for `catalog` under these options
    pub fn strategies(&self, catalog: &VariantCatalog) -> Result<StrategyTable, HarnessError> {
        Ok(StrategyTable::build(
            catalog,
            &self.bin_dir,
            &self.contract,
            self.convention,
            &self.overrides,
        )?)
    }
}

/// Run the PQBench CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the PQBench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Initialize logging; a second call in the same process keeps the first subscriber
    let filter = if cli.verbose {
        "pqbench=debug"
    } else {
        "pqbench=info"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    if cli.command == Some(Commands::Config) {
        print!("{}", PqConfig::default_toml());
        return Ok(());
    }

    // Explicit --config must load; a discovered pqbench.toml is best-effort
    let config = match &cli.config {
        Some(path) => PqConfig::load(path)?,
        None => PqConfig::discover().unwrap_or_default(),
    };

    let selection = match cli.selection.as_deref() {
        Some(answer) => Selection::from_menu_input(answer)?,
        None => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            prompt(&mut stdin.lock(), &mut stdout.lock())?
        }
    };

    let options = RunOptions::resolve(&cli, &config, selection.families())?;

    if cli.dry_run || cli.command == Some(Commands::List) {
        let catalog = VariantCatalog::builtin();
        let strategies = options.strategies(&catalog)?;
        let plan = build_plan(&catalog, &options.families, options.filter.as_ref());
        print!("{}", format_plan(&plan, &strategies));
        return Ok(());
    }

    let summary = sweep(&options)?;
    print!("{}", format_human_output(&summary));

    if let Some(path) = cli.summary.clone().or_else(|| config.output.summary.map(PathBuf::from)) {
        std::fs::write(&path, generate_json_summary(&summary)?)?;
        println!("Summary written to: {}", path.display());
    }

    if cli.strict && summary.failures > 0 {
        return Err(HarnessError::FailuresRecorded(summary.failures).into());
    }

    Ok(())
}

/// Sweep every selected family with the built-in catalog and export one
/// CSV file per family.
pub fn sweep(options: &RunOptions) -> Result<RunSummary, HarnessError> {
    sweep_catalog(&VariantCatalog::builtin(), options)
}

/// [`sweep`] over a caller-provided catalog
pub fn sweep_catalog(
    catalog: &VariantCatalog,
    options: &RunOptions,
) -> Result<RunSummary, HarnessError> {
    let strategies = options.strategies(catalog)?;
    let plan = build_plan(catalog, &options.families, options.filter.as_ref());

    tracing::info!(
        families = options.families.len(),
        requests = plan.len(),
        timeout = ?options.timeout,
        "starting run"
    );

    let sweeper = Sweeper::new(
        &strategies,
        ChildProcessRunner::new(options.grace_period),
        ReportWriter::new(&options.output_dir).with_suffix(options.suffix.clone()),
        SweepConfig {
            timeout: options.timeout,
            verification: options.verification,
            progress: options.progress,
        },
    );

    let mut aggregator = ResultAggregator::new();
    let families = sweeper.run(&plan, &mut aggregator);

    Ok(RunSummary {
        meta: build_run_meta(options.timeout),
        families,
        failures: aggregator.failures(),
    })
}
