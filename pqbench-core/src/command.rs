//! Invocation building
//!
//! Maps an [`ExecutionRequest`] to the argument vector of the family's
//! executable. Pure: nothing here touches the filesystem or spawns anything.
//!
//! Two conventions exist for prehash-capable families:
//!
//! ```text
//! positional      ./SLH-DSA 1 SLH-DSA-SHA2-128s
//! name-embedding  ./SLH-DSA Hash-SLH-DSA-SHA2-128s-with-SHA256
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::CoreError;
use crate::catalog::{HashFamily, VariantSpec};
use crate::request::{ExecutionRequest, PrehashMode};

/// How the prehash mode reaches the executable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrehashConvention {
    /// `[flag, variant]` with flag `0` or `1`
    #[default]
    Positional,
    /// A single `Hash-<variant>-with-<digest>` argument when prehash is on
    NameEmbedding,
}

impl FromStr for PrehashConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "positional" | "flag" => Ok(PrehashConvention::Positional),
            "name-embedding" | "embedded" => Ok(PrehashConvention::NameEmbedding),
            other => Err(format!("Unknown prehash convention: {}", other)),
        }
    }
}

impl fmt::Display for PrehashConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrehashConvention::Positional => f.write_str("positional"),
            PrehashConvention::NameEmbedding => f.write_str("name-embedding"),
        }
    }
}

/// Concrete program + arguments for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable path
    pub program: PathBuf,
    /// Arguments, excluding the program itself
    pub args: Vec<String>,
}

impl Invocation {
    /// Full argument vector with the program first
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv().join(" "))
    }
}

/// Pre-hash digest paired with a security level and hash family
pub fn prehash_digest(hash: HashFamily, level: u16) -> &'static str {
    match (hash, level <= 128) {
        (HashFamily::Sha2, true) => "SHA256",
        (HashFamily::Sha2, false) => "SHA512",
        (HashFamily::Shake, true) => "SHAKE128",
        (HashFamily::Shake, false) => "SHAKE256",
    }
}

/// Alternate invocation name used by the name-embedding convention,
/// e.g. `SLH-DSA-SHAKE-192f` → `Hash-SLH-DSA-SHAKE-192f-with-SHAKE256`.
pub fn prehashed_invocation_name(variant: &VariantSpec) -> Result<String, CoreError> {
    let (hash, level) = variant
        .hash_parameters()
        .ok_or_else(|| CoreError::NoPrehashName(variant.name.clone()))?;
    Ok(format!(
        "Hash-{}-with-{}",
        variant.name,
        prehash_digest(hash, level)
    ))
}

/// Arguments for `request`. `convention` is `None` for families without a
/// prehash capability, in which case only the variant name is passed.
pub fn build_arguments(
    request: &ExecutionRequest,
    convention: Option<PrehashConvention>,
) -> Result<Vec<String>, CoreError> {
    let name = request.variant.name.clone();
    let Some(convention) = convention else {
        return Ok(vec![name]);
    };

    let mode = request.mode.unwrap_or(PrehashMode::NoPrehash);
    match convention {
        PrehashConvention::Positional => Ok(vec![mode.flag().to_string(), name]),
        PrehashConvention::NameEmbedding if mode.is_enabled() => {
            Ok(vec![prehashed_invocation_name(&request.variant)?])
        }
        PrehashConvention::NameEmbedding => Ok(vec![name]),
    }
}
