//! Output Formatting
//!
//! Human-readable output for plans and finished runs.

use crate::planner::ExecutionPlan;
use pqbench_core::StrategyTable;
use pqbench_report::{FailureKind, RunSummary};

/// Format a finished run for terminal display
pub fn format_human_output(summary: &RunSummary) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("PQBench Results\n");
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    for family in &summary.families {
        output.push_str(&format!(
            "Family: {} ({} rows, {} failures)\n",
            family.family,
            family.rows,
            family.failures.len()
        ));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        match (&family.report_file, &family.export_error) {
            (Some(path), _) => output.push_str(&format!("  ✓ {}\n", path)),
            (None, Some(err)) => output.push_str(&format!("  ✗ export failed: {}\n", err)),
            (None, None) => {}
        }

        for failure in &family.failures {
            let icon = match failure.kind {
                FailureKind::TimedOut => "⏱",
                FailureKind::VerificationFailed => "⚠",
                FailureKind::NonZeroExit | FailureKind::LaunchFailed => "✗",
            };
            output.push_str(&format!(
                "  {} {:<28} prehash={:<3} {}",
                icon,
                failure.variant,
                failure.prehash,
                failure.kind.label()
            ));
            if let Some(detail) = &failure.detail {
                output.push_str(&format!(": {}", first_line(detail)));
            }
            output.push('\n');
        }

        output.push('\n');
    }

    // Summary
    output.push_str("Summary\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    let rows: usize = summary.families.iter().map(|f| f.rows).sum();
    output.push_str(&format!(
        "  Families: {}  Rows: {}  Failures: {}\n",
        summary.families.len(),
        rows,
        summary.failures
    ));

    output
}

/// Format the plan with the command line each request would use
pub fn format_plan(plan: &ExecutionPlan, strategies: &StrategyTable) -> String {
    let mut output = String::from("PQBench Plan:\n");

    for family_plan in &plan.families {
        output.push_str(&format!("├── family: {}\n", family_plan.family));
        for request in &family_plan.requests {
            let command = strategies
                .build_command(request)
                .map(|invocation| invocation.to_string())
                .unwrap_or_else(|e| format!("<{}>", e));
            output.push_str(&format!("│   ├── {:<36} {}\n", request.to_string(), command));
        }
    }

    output.push_str(&format!("{} requests planned.\n", plan.len()));
    output
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}
