//! Sweep Execution
//!
//! Drives every request of a plan through its family strategy, one at a time.
//!
//! ## Data Flow
//!
//! ```text
//! ExecutionRequest
//!        │  FamilyStrategy::build_command
//!        ▼
//!   Invocation ──► ProcessRunner ──► ExecutionOutcome
//!                                         │
//!              ┌──────────────────────────┤
//!              ▼                          ▼
//!   FamilyStrategy::parse_output     FailureRecord
//!              │                          │
//!              ▼                          ▼
//!         MeasuredRow ──────────► ResultAggregator ──► ResultSet ──► ReportWriter
//! ```
//!
//! Requests never run concurrently: cycle counts and wall times are only
//! comparable when nothing else competes for the CPU.

use crate::config::VerificationPolicy;
use crate::executor::aggregator::ResultAggregator;
use crate::planner::{ExecutionPlan, FamilyPlan};
use crate::supervisor::{ExecutionOutcome, ProcessRunner};
use indicatif::{ProgressBar, ProgressStyle};
use pqbench_core::{ExecutionRequest, Family, StrategyTable};
use pqbench_report::{FailureKind, FailureRecord, FamilySummary, MeasuredRow, ReportWriter};
use std::time::Duration;

/// Settings shared by every request of a sweep
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Per-invocation timeout
    pub timeout: Duration,
    /// Row handling for reports with the failure marker
    pub verification: VerificationPolicy,
    /// Draw a progress bar per family
    pub progress: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            verification: VerificationPolicy::default(),
            progress: true,
        }
    }
}

/// Sequential orchestrator over a family-keyed strategy table
pub struct Sweeper<'a, R: ProcessRunner> {
    strategies: &'a StrategyTable,
    runner: R,
    writer: ReportWriter,
    config: SweepConfig,
}

impl<'a, R: ProcessRunner> Sweeper<'a, R> {
    /// Sweeper exporting through `writer`
    pub fn new(
        strategies: &'a StrategyTable,
        runner: R,
        writer: ReportWriter,
        config: SweepConfig,
    ) -> Self {
        Self {
            strategies,
            runner,
            writer,
            config,
        }
    }

    /// Sweep every family of `plan` and export each one as soon as its
    /// sweep ends. An export failure is reported and the run moves on.
    pub fn run(&self, plan: &ExecutionPlan, aggregator: &mut ResultAggregator) -> Vec<FamilySummary> {
        plan.families
            .iter()
            .map(|family_plan| {
                self.sweep_family(family_plan, aggregator);
                self.export(family_plan.family, aggregator)
            })
            .collect()
    }

    /// Run every request of one family
    pub fn sweep_family(&self, plan: &FamilyPlan, aggregator: &mut ResultAggregator) {
        let pb = self.progress_bar(plan);

        tracing::info!(
            family = %plan.family,
            requests = plan.requests.len(),
            "starting sweep"
        );

        for request in &plan.requests {
            pb.set_message(request.to_string());
            self.execute(request, aggregator);
            pb.inc(1);
        }

        pb.finish_with_message(format!("{} complete", plan.family));
    }

    /// Run a single request and record its row or its failure
    pub fn execute(&self, request: &ExecutionRequest, aggregator: &mut ResultAggregator) {
        let family = request.family();

        let invocation = match self
            .strategies
            .get(family)
            .and_then(|strategy| strategy.build_command(request))
        {
            Ok(invocation) => invocation,
            Err(e) => {
                tracing::warn!(request = %request, "cannot build invocation: {}", e);
                aggregator.record_failure(
                    family,
                    failure(request, FailureKind::LaunchFailed, Some(e.to_string())),
                );
                return;
            }
        };

        tracing::info!(command = %invocation, "running {}", request);

        match self.runner.run(&invocation, self.config.timeout) {
            ExecutionOutcome::Success(stdout) => self.accept(request, &stdout, aggregator),
            ExecutionOutcome::NonZeroExit { code, stderr } => {
                let status = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                tracing::warn!(
                    request = %request,
                    status = %status,
                    "executable failed: {}",
                    stderr.trim()
                );
                let detail = if stderr.trim().is_empty() {
                    format!("exit status {}", status)
                } else {
                    format!("exit status {}: {}", status, stderr.trim())
                };
                aggregator.record_failure(
                    family,
                    failure(request, FailureKind::NonZeroExit, Some(detail)),
                );
            }
            ExecutionOutcome::TimedOut => {
                tracing::warn!(
                    request = %request,
                    "timed out after {:?}",
                    self.config.timeout
                );
                aggregator.record_failure(family, failure(request, FailureKind::TimedOut, None));
            }
            ExecutionOutcome::LaunchFailed(message) => {
                tracing::warn!(request = %request, "could not start executable: {}", message);
                aggregator.record_failure(
                    family,
                    failure(request, FailureKind::LaunchFailed, Some(message)),
                );
            }
        }
    }

    fn accept(&self, request: &ExecutionRequest, stdout: &str, aggregator: &mut ResultAggregator) {
        let family = request.family();
        let parsed = match self.strategies.get(family) {
            Ok(strategy) => strategy.parse_output(stdout),
            Err(e) => {
                tracing::warn!(request = %request, "{}", e);
                return;
            }
        };

        for anomaly in &parsed.anomalies {
            tracing::warn!(request = %request, "{}; sentinel recorded", anomaly);
        }

        let row = MeasuredRow::from_parsed(request, &parsed);

        if parsed.verification_failed {
            tracing::warn!(request = %request, "report carries the verification-failure marker");
            aggregator.record_failure(
                family,
                failure(request, FailureKind::VerificationFailed, None),
            );
            if self.config.verification == VerificationPolicy::Discard {
                return;
            }
        }

        aggregator.record(family, row);
    }

    /// Finalize and write one family
    fn export(&self, family: Family, aggregator: &mut ResultAggregator) -> FamilySummary {
        let set = aggregator.finalize(family);
        let failures = aggregator.failure_records(family).to_vec();

        let (report_file, export_error) = match self.writer.write(&set) {
            Ok(path) => {
                tracing::info!(family = %family, rows = set.len(), "wrote {}", path.display());
                (Some(path.display().to_string()), None)
            }
            Err(e) => {
                tracing::error!(family = %family, "export failed: {}", e);
                (None, Some(e.to_string()))
            }
        };

        FamilySummary {
            family,
            rows: set.len(),
            report_file,
            export_error,
            failures,
        }
    }

    fn progress_bar(&self, plan: &FamilyPlan) -> ProgressBar {
        if !self.config.progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(plan.requests.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    }
}

fn failure(request: &ExecutionRequest, kind: FailureKind, detail: Option<String>) -> FailureRecord {
    FailureRecord {
        variant: request.variant.name.clone(),
        prehash: request.mode_label().to_string(),
        kind,
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::build_plan;
    use pqbench_core::{Invocation, VariantCatalog};
    use std::cell::RefCell;
    use std::path::Path;

    const REPORT: &str = "\
RESULTADOS DE GENERACIÓN DE CLAVES
Tiempo de ejecución: 0.002s
Ciclos de CPU: 5000 ciclos
Tamaño de la clave pública: 32 bytes
Tamaño de la clave privada: 64 bytes
RESULTADOS DE GENERACIÓN DE FIRMA
Tiempo de ejecución: 0.010s
Ciclos de CPU: 30000 ciclos
Tamaño de la firma: 7856 bytes
RESULTADOS DE VERIFICACIÓN DE FIRMA
Tiempo de ejecución: 0.001s
Ciclos de CPU: 2000 ciclos
";

    /// Answers from a script keyed by the last argument
    struct ScriptedRunner {
        script: fn(&Invocation) -> ExecutionOutcome,
        calls: RefCell<Vec<Vec<String>>>,
    }

    impl ScriptedRunner {
        fn new(script: fn(&Invocation) -> ExecutionOutcome) -> Self {
            Self {
                script,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl ProcessRunner for &ScriptedRunner {
        fn run(&self, invocation: &Invocation, _timeout: Duration) -> ExecutionOutcome {
            self.calls.borrow_mut().push(invocation.args.clone());
            (self.script)(invocation)
        }
    }

    fn catalog() -> VariantCatalog {
        VariantCatalog::builder()
            .family(Family::Xmss, false, ["ok", "slow", "broken"])
            .family(Family::SlhDsa, true, ["SLH-DSA-SHA2-128s"])
            .build()
    }

    fn config() -> SweepConfig {
        SweepConfig {
            progress: false,
            ..SweepConfig::default()
        }
    }

    fn by_variant(invocation: &Invocation) -> ExecutionOutcome {
        match invocation.args.last().map(String::as_str) {
            Some("slow") => ExecutionOutcome::TimedOut,
            Some("broken") => ExecutionOutcome::NonZeroExit {
                code: Some(2),
                stderr: "boom".to_string(),
            },
            _ => ExecutionOutcome::Success(REPORT.to_string()),
        }
    }

    #[test]
    fn test_failures_are_counted_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = catalog();
        let strategies = StrategyTable::with_defaults(&catalog, Path::new("/opt/bin")).unwrap();
        let runner = ScriptedRunner::new(by_variant);
        let sweeper = Sweeper::new(&strategies, &runner, ReportWriter::new(dir.path()), config());

        let plan = build_plan(&catalog, &[Family::Xmss], None);
        let mut agg = ResultAggregator::new();
        let summaries = sweeper.run(&plan, &mut agg);

        assert_eq!(agg.failures(), 2);
        assert_eq!(summaries[0].rows, 1);
        assert_eq!(summaries[0].failures.len(), 2);
        assert_eq!(summaries[0].failures[0].kind, FailureKind::TimedOut);
        assert_eq!(summaries[0].failures[1].kind, FailureKind::NonZeroExit);
        assert!(dir.path().join("XMSS_Resultados.csv").exists());
    }

    #[test]
    fn test_prehash_sweep_passes_flag_first() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = catalog();
        let strategies = StrategyTable::with_defaults(&catalog, Path::new("/opt/bin")).unwrap();
        let runner = ScriptedRunner::new(by_variant);
        let sweeper = Sweeper::new(&strategies, &runner, ReportWriter::new(dir.path()), config());

        let plan = build_plan(&catalog, &[Family::SlhDsa], None);
        let mut agg = ResultAggregator::new();
        sweeper.run(&plan, &mut agg);

        let calls = runner.calls.borrow();
        assert_eq!(
            *calls,
            vec![
                vec!["0".to_string(), "SLH-DSA-SHA2-128s".to_string()],
                vec!["1".to_string(), "SLH-DSA-SHA2-128s".to_string()],
            ]
        );
        let set = agg.finalize(Family::SlhDsa);
        assert_eq!(set.rows[0].prehash, "No");
        assert_eq!(set.rows[1].prehash, "Sí");
        assert_eq!(set.rows[0].total_cycles, 37000);
    }

    #[test]
    fn test_verification_marker_policy() {
        fn marked(_: &Invocation) -> ExecutionOutcome {
            ExecutionOutcome::Success(format!("{}Firma Errónea.\n", REPORT))
        }

        for (policy, expected_rows) in [
            (VerificationPolicy::Record, 1),
            (VerificationPolicy::Discard, 0),
        ] {
            let dir = tempfile::tempdir().unwrap();
            let catalog = VariantCatalog::builder()
                .family(Family::MlDsa, false, ["ML-DSA-44"])
                .build();
            let strategies = StrategyTable::with_defaults(&catalog, Path::new(".")).unwrap();
            let runner = ScriptedRunner::new(marked);
            let sweeper = Sweeper::new(
                &strategies,
                &runner,
                ReportWriter::new(dir.path()),
                SweepConfig {
                    verification: policy,
                    ..config()
                },
            );

            let mut agg = ResultAggregator::new();
            let summaries = sweeper.run(&build_plan(&catalog, &[Family::MlDsa], None), &mut agg);
            assert_eq!(agg.failures(), 1);
            assert_eq!(summaries[0].rows, expected_rows);
            assert_eq!(
                summaries[0].failures[0].kind,
                FailureKind::VerificationFailed
            );
        }
    }

    #[test]
    fn test_export_failure_does_not_stop_other_families() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let catalog = catalog();
        let strategies = StrategyTable::with_defaults(&catalog, Path::new(".")).unwrap();
        let runner = ScriptedRunner::new(by_variant);
        let sweeper = Sweeper::new(&strategies, &runner, ReportWriter::new(&blocker), config());

        let plan = build_plan(&catalog, &[Family::Xmss, Family::SlhDsa], None);
        let mut agg = ResultAggregator::new();
        let summaries = sweeper.run(&plan, &mut agg);

        assert_eq!(summaries.len(), 2);
        assert!(summaries.iter().all(|s| s.export_error.is_some()));
        // Both families were still swept
        assert_eq!(runner.calls.borrow().len(), 5);
    }
}
