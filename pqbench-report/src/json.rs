//! JSON Output

use crate::report::RunSummary;

/// Generate a prettified JSON run summary.
pub fn generate_json_summary(summary: &RunSummary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{FailureKind, FailureRecord, FamilySummary, RunMeta, SystemInfo};
    use pqbench_core::Family;

    #[test]
    fn test_summary_serializes_family_ids_and_kinds() {
        let summary = RunSummary {
            meta: RunMeta {
                version: "0.1.0".to_string(),
                timestamp: chrono::Utc::now(),
                system: SystemInfo {
                    os: "linux".to_string(),
                    arch: "x86_64".to_string(),
                    cpu: "test".to_string(),
                    cpu_cores: 1,
                },
                timeout_secs: 60.0,
            },
            families: vec![FamilySummary {
                family: Family::SlhDsa,
                rows: 23,
                report_file: Some("SLH-DSA_Resultados.csv".to_string()),
                export_error: None,
                failures: vec![FailureRecord {
                    variant: "SLH-DSA-SHAKE-256s".to_string(),
                    prehash: "Sí".to_string(),
                    kind: FailureKind::TimedOut,
                    detail: None,
                }],
            }],
            failures: 1,
        };

        let json = generate_json_summary(&summary).unwrap();
        assert!(json.contains("\"family\": \"SLH-DSA\""));
        assert!(json.contains("\"kind\": \"timed-out\""));

        let back: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.families[0].failures[0].kind, FailureKind::TimedOut);
    }
}
