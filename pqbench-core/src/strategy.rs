//! Family strategy table
//!
//! One orchestrator drives every family; what differs per family lives here:
//! the executable, how the prehash mode is passed, and how the report is read.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::CoreError;
use crate::catalog::{Family, VariantCatalog};
use crate::command::{Invocation, PrehashConvention, build_arguments};
use crate::parser::{ParsedReport, ReportContract, ReportParser};
use crate::request::ExecutionRequest;

/// Capabilities of one family
#[derive(Debug, Clone)]
pub struct FamilyStrategy {
    family: Family,
    executable: PathBuf,
    convention: Option<PrehashConvention>,
    parser: ReportParser,
}

impl FamilyStrategy {
    /// Family this strategy serves
    pub fn family(&self) -> Family {
        self.family
    }

    /// Resolved executable path
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Prehash convention, `None` when the family has no prehash mode
    pub fn convention(&self) -> Option<PrehashConvention> {
        self.convention
    }

    /// Whether the family has a prehash mode
    pub fn supports_prehash(&self) -> bool {
        self.convention.is_some()
    }

    /// Invocation for `request`
    pub fn build_command(&self, request: &ExecutionRequest) -> Result<Invocation, CoreError> {
        Ok(Invocation {
            program: self.executable.clone(),
            args: build_arguments(request, self.convention)?,
        })
    }

    /// Parse a report printed by this family's executable
    pub fn parse_output(&self, text: &str) -> ParsedReport {
        self.parser.parse(text)
    }
}

/// Per-family overrides applied when building the table
#[derive(Debug, Clone, Default)]
pub struct FamilyOverrides {
    /// Executable path; relative paths are resolved against the bin dir
    pub executable: Option<PathBuf>,
    /// Convention for prehash-capable families
    pub convention: Option<PrehashConvention>,
}

/// Family-keyed strategy table
#[derive(Debug, Clone)]
pub struct StrategyTable {
    strategies: BTreeMap<Family, FamilyStrategy>,
}

impl StrategyTable {
    /// Build a strategy for every family in `catalog`.
    ///
    /// Executables default to `<bin_dir>/<family id>`. A convention override on
    /// a family without prehash capability is ignored.
    pub fn build(
        catalog: &VariantCatalog,
        bin_dir: &Path,
        contract: &ReportContract,
        default_convention: PrehashConvention,
        overrides: &BTreeMap<Family, FamilyOverrides>,
    ) -> Result<Self, CoreError> {
        let parser = ReportParser::new(contract.clone())?;
        let mut strategies = BTreeMap::new();

        for family in catalog.families() {
            let family_overrides = overrides.get(&family).cloned().unwrap_or_default();
            let executable = match family_overrides.executable {
                Some(path) if path.is_absolute() => path,
                Some(path) => bin_dir.join(path),
                None => bin_dir.join(family.id()),
            };
            let convention = catalog
                .supports_prehash(family)
                .then(|| family_overrides.convention.unwrap_or(default_convention));

            strategies.insert(
                family,
                FamilyStrategy {
                    family,
                    executable,
                    convention,
                    parser: parser.clone(),
                },
            );
        }

        Ok(Self { strategies })
    }

    /// Table with default executables and contract
    pub fn with_defaults(catalog: &VariantCatalog, bin_dir: &Path) -> Result<Self, CoreError> {
        Self::build(
            catalog,
            bin_dir,
            &ReportContract::default(),
            PrehashConvention::default(),
            &BTreeMap::new(),
        )
    }

    /// Strategy for `family`
    pub fn get(&self, family: Family) -> Result<&FamilyStrategy, CoreError> {
        self.strategies
            .get(&family)
            .ok_or(CoreError::MissingStrategy(family))
    }

    /// Invocation for `request` through its family's strategy
    pub fn build_command(&self, request: &ExecutionRequest) -> Result<Invocation, CoreError> {
        self.get(request.family())?.build_command(request)
    }
}
