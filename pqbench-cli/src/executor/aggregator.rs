//! Result Aggregation
//!
//! Owns the per-family result sets and the failure counter for one run.
//! Constructed once and threaded through the sweep loop.

use pqbench_core::Family;
use pqbench_report::{FailureRecord, MeasuredRow, MetricRow, ResultSet};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct FamilyRows {
    finalized: Vec<MetricRow>,
    pending: Vec<MeasuredRow>,
    failures: Vec<FailureRecord>,
}

/// Accumulates rows per family and counts failures across the run
#[derive(Debug, Default)]
pub struct ResultAggregator {
    families: BTreeMap<Family, FamilyRows>,
    failures: u64,
}

impl ResultAggregator {
    /// Empty aggregator with a zero failure counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a measured row to `family`'s set
    pub fn record(&mut self, family: Family, row: MeasuredRow) {
        self.families.entry(family).or_default().pending.push(row);
    }

    /// Count one failure and keep its record for the summary
    pub fn record_failure(&mut self, family: Family, failure: FailureRecord) {
        self.failures += 1;
        self.families.entry(family).or_default().failures.push(failure);
    }

    /// Add totals to every pending row of `family` and return the full set,
    /// in insertion order. Rows already finalized are left untouched.
    pub fn finalize(&mut self, family: Family) -> ResultSet {
        let rows = self.families.entry(family).or_default();
        let pending = std::mem::take(&mut rows.pending);
        rows.finalized
            .extend(pending.into_iter().map(MetricRow::finalize));

        ResultSet {
            family,
            rows: rows.finalized.clone(),
        }
    }

    /// Current value of the failure counter
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Failure records of `family`, in the order they happened
    pub fn failure_records(&self, family: Family) -> &[FailureRecord] {
        self.families
            .get(&family)
            .map(|rows| rows.failures.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pqbench_report::FailureKind;

    fn measured(variant: &str, base: i64) -> MeasuredRow {
        MeasuredRow {
            variant: variant.to_string(),
            prehash: "No".to_string(),
            keygen_time: 0.002,
            keygen_cycles: base,
            public_key_bytes: 32,
            private_key_bytes: 64,
            sign_time: 0.010,
            sign_cycles: base * 6,
            signature_bytes: 7856,
            verify_time: 0.001,
            verify_cycles: base / 2,
            verification_failed: false,
        }
    }

    fn failure(variant: &str, kind: FailureKind) -> FailureRecord {
        FailureRecord {
            variant: variant.to_string(),
            prehash: "No".to_string(),
            kind,
            detail: None,
        }
    }

    #[test]
    fn test_finalize_adds_totals_in_insertion_order() {
        let mut agg = ResultAggregator::new();
        agg.record(Family::SlhDsa, measured("b", 5000));
        agg.record(Family::SlhDsa, measured("a", 1000));

        let set = agg.finalize(Family::SlhDsa);
        assert_eq!(set.family, Family::SlhDsa);
        let names: Vec<_> = set.rows.iter().map(|r| r.variant.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(set.rows[0].total_cycles, 5000 + 30000 + 2500);
        assert!((set.rows[0].total_time - 0.013).abs() < 1e-12);
    }

    #[test]
    fn test_finalize_twice_does_not_duplicate() {
        let mut agg = ResultAggregator::new();
        agg.record(Family::Xmss, measured("x", 10));
        assert_eq!(agg.finalize(Family::Xmss).len(), 1);

        agg.record(Family::Xmss, measured("y", 10));
        let set = agg.finalize(Family::Xmss);
        assert_eq!(set.len(), 2);
        assert_eq!(set.rows[1].variant, "y");
    }

    #[test]
    fn test_families_are_kept_apart() {
        let mut agg = ResultAggregator::new();
        agg.record(Family::MlDsa, measured("m", 10));
        agg.record(Family::Xmss, measured("x", 10));
        assert_eq!(agg.finalize(Family::MlDsa).len(), 1);
        assert_eq!(agg.finalize(Family::Xmss).len(), 1);
        assert!(agg.finalize(Family::SlhDsa).is_empty());
    }

    #[test]
    fn test_failure_counter_only_grows() {
        let mut agg = ResultAggregator::new();
        assert_eq!(agg.failures(), 0);
        agg.record_failure(Family::Xmss, failure("x", FailureKind::TimedOut));
        agg.record_failure(Family::SlhDsa, failure("s", FailureKind::NonZeroExit));
        agg.finalize(Family::Xmss);
        assert_eq!(agg.failures(), 2);
        assert_eq!(agg.failure_records(Family::Xmss).len(), 1);
        assert_eq!(
            agg.failure_records(Family::SlhDsa)[0].kind,
            FailureKind::NonZeroExit
        );
        assert!(agg.failure_records(Family::MlDsa).is_empty());
    }
}
