//! Sweep Planner
//!
//! Expands a family selection into the ordered list of requests to run.
//!
//! Ordering follows the catalog. For prehash-capable families the mode is the
//! outer loop, so every variant runs without prehash before any runs with it.
//! A `--filter` regex drops variants by name without reordering the rest.

use pqbench_core::{ExecutionRequest, Family, PrehashMode, VariantCatalog};

/// Requests for one family, in execution order
#[derive(Debug, Clone)]
pub struct FamilyPlan {
    /// Planned family
    pub family: Family,
    /// Mode-major, catalog-ordered requests
    pub requests: Vec<ExecutionRequest>,
}

/// Execution plan for a selection of families
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    /// Family plans in selection order
    pub families: Vec<FamilyPlan>,
}

impl ExecutionPlan {
    /// Total number of requests across families
    pub fn len(&self) -> usize {
        self.families.iter().map(|f| f.requests.len()).sum()
    }

    /// Nothing to run
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every request, family by family
    pub fn requests(&self) -> impl Iterator<Item = &ExecutionRequest> {
        self.families.iter().flat_map(|f| f.requests.iter())
    }
}

/// Build the plan for `families`, in the given order
pub fn build_plan(
    catalog: &VariantCatalog,
    families: &[Family],
    filter: Option<&regex::Regex>,
) -> ExecutionPlan {
    let families = families
        .iter()
        .map(|&family| FamilyPlan {
            family,
            requests: plan_family(catalog, family, filter),
        })
        .collect();

    ExecutionPlan { families }
}

fn plan_family(
    catalog: &VariantCatalog,
    family: Family,
    filter: Option<&regex::Regex>,
) -> Vec<ExecutionRequest> {
    let selected: Vec<_> = catalog
        .variants(family)
        .iter()
        .filter(|v| filter.is_none_or(|re| re.is_match(&v.name)))
        .collect();

    if catalog.supports_prehash(family) {
        PrehashMode::SWEEP
            .iter()
            .flat_map(|&mode| {
                selected
                    .iter()
                    .map(move |&v| ExecutionRequest::new(v.clone(), Some(mode)))
            })
            .collect()
    } else {
        selected
            .into_iter()
            .map(|v| ExecutionRequest::new(v.clone(), None))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_catalog() -> VariantCatalog {
        VariantCatalog::builder()
            .family(Family::Xmss, false, ["XMSS-SHA2_10_256", "XMSS-SHAKE_10_256"])
            .family(
                Family::SlhDsa,
                true,
                ["SLH-DSA-SHA2-128s", "SLH-DSA-SHAKE-128f"],
            )
            .build()
    }

    #[test]
    fn test_plan_without_prehash_follows_catalog() {
        let plan = build_plan(&small_catalog(), &[Family::Xmss], None);
        let names: Vec<_> = plan.requests().map(|r| r.variant.name.as_str()).collect();
        assert_eq!(names, vec!["XMSS-SHA2_10_256", "XMSS-SHAKE_10_256"]);
        assert!(plan.requests().all(|r| r.mode.is_none()));
    }

    #[test]
    fn test_plan_mode_is_outer_loop() {
        let plan = build_plan(&small_catalog(), &[Family::SlhDsa], None);
        let order: Vec<_> = plan
            .requests()
            .map(|r| (r.variant.name.as_str(), r.mode))
            .collect();
        assert_eq!(
            order,
            vec![
                ("SLH-DSA-SHA2-128s", Some(PrehashMode::NoPrehash)),
                ("SLH-DSA-SHAKE-128f", Some(PrehashMode::NoPrehash)),
                ("SLH-DSA-SHA2-128s", Some(PrehashMode::Prehash)),
                ("SLH-DSA-SHAKE-128f", Some(PrehashMode::Prehash)),
            ]
        );
    }

    #[test]
    fn test_plan_families_in_selection_order() {
        let plan = build_plan(&small_catalog(), &[Family::SlhDsa, Family::Xmss], None);
        let families: Vec<_> = plan.families.iter().map(|f| f.family).collect();
        assert_eq!(families, vec![Family::SlhDsa, Family::Xmss]);
        assert_eq!(plan.len(), 6);
    }

    #[test]
    fn test_filter_keeps_order() {
        let re = regex::Regex::new("SHAKE").unwrap();
        let plan = build_plan(&small_catalog(), &[Family::Xmss, Family::SlhDsa], Some(&re));
        let names: Vec<_> = plan.requests().map(|r| r.variant.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["XMSS-SHAKE_10_256", "SLH-DSA-SHAKE-128f", "SLH-DSA-SHAKE-128f"]
        );
    }

    #[test]
    fn test_builtin_plan_sizes() {
        let catalog = VariantCatalog::builtin();
        let plan = build_plan(&catalog, &Family::ALL, None);
        assert_eq!(plan.families[0].requests.len(), 3);
        assert_eq!(plan.families[1].requests.len(), 21);
        assert_eq!(plan.families[2].requests.len(), 24);
    }

    #[test]
    fn test_unknown_family_gives_empty_plan() {
        let plan = build_plan(&small_catalog(), &[Family::MlDsa], None);
        assert!(plan.is_empty());
    }
}
