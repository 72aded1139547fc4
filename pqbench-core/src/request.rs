//! Execution requests: one (family, variant, mode) tuple to run.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{Family, VariantSpec};

/// Prehash indicator for families that support it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrehashMode {
    /// Sign the message directly
    NoPrehash,
    /// Hash the message before signing
    Prehash,
}

impl PrehashMode {
    /// Sweep order for prehash-capable families
    pub const SWEEP: [PrehashMode; 2] = [PrehashMode::NoPrehash, PrehashMode::Prehash];

    /// Positional flag understood by the executables (`0` / `1`)
    pub fn flag(self) -> &'static str {
        match self {
            PrehashMode::NoPrehash => "0",
            PrehashMode::Prehash => "1",
        }
    }

    /// Label written in the `Prehash` column
    pub fn label(self) -> &'static str {
        match self {
            PrehashMode::NoPrehash => "No",
            PrehashMode::Prehash => "Sí",
        }
    }

    /// Whether the message is hashed first
    pub fn is_enabled(self) -> bool {
        matches!(self, PrehashMode::Prehash)
    }
}

/// A single invocation to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    /// Variant to benchmark (carries its family)
    pub variant: VariantSpec,
    /// Prehash mode; `None` for families without the capability
    pub mode: Option<PrehashMode>,
}

impl ExecutionRequest {
    /// Request for `variant`. The mode is dropped when the variant's family
    /// has no prehash capability.
    pub fn new(variant: VariantSpec, mode: Option<PrehashMode>) -> Self {
        let mode = if variant.supports_prehash { mode } else { None };
        Self { variant, mode }
    }

    /// Family of the requested variant
    pub fn family(&self) -> Family {
        self.variant.family
    }

    /// Label for the `Prehash` column; families without the mode report `No`.
    pub fn mode_label(&self) -> &'static str {
        self.mode.unwrap_or(PrehashMode::NoPrehash).label()
    }
}

impl fmt::Display for ExecutionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Some(mode) => write!(f, "{} | prehash={}", self.variant.name, mode.flag()),
            None => f.write_str(&self.variant.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::VariantCatalog;

    #[test]
    fn test_mode_is_dropped_without_capability() {
        let catalog = VariantCatalog::builtin();
        let variant = catalog.variants(Family::Xmss)[0].clone();
        let request = ExecutionRequest::new(variant, Some(PrehashMode::Prehash));
        assert_eq!(request.mode, None);
        assert_eq!(request.mode_label(), "No");
    }

    #[test]
    fn test_prehash_labels_and_flags() {
        assert_eq!(PrehashMode::Prehash.label(), "Sí");
        assert_eq!(PrehashMode::NoPrehash.label(), "No");
        assert_eq!(PrehashMode::Prehash.flag(), "1");
        assert_eq!(PrehashMode::NoPrehash.flag(), "0");
    }

    #[test]
    fn test_display_includes_prehash_flag() {
        let catalog = VariantCatalog::builtin();
        let variant = catalog.variants(Family::SlhDsa)[1].clone();
        let request = ExecutionRequest::new(variant, Some(PrehashMode::Prehash));
        assert_eq!(request.to_string(), "SLH-DSA-SHA2-128f | prehash=1");
    }
}
