//! Configuration loading from pqbench.toml
//!
//! PQBench configuration can be specified in a `pqbench.toml` file next to the
//! signature executables. The configuration is automatically discovered by
//! walking up from the current directory.

use pqbench_core::{Family, FamilyOverrides, PrehashConvention, ReportContract};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name looked up during discovery
pub const CONFIG_FILE: &str = "pqbench.toml";

/// PQBench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PqConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
    /// Report text contract (labels, headers, marker, sentinel)
    #[serde(default)]
    pub report: ReportContract,
    /// Verification-failure handling
    #[serde(default)]
    pub verification: VerificationConfig,
    /// Per-family overrides keyed by family id (`ML-DSA`, `XMSS`, `SLH-DSA`)
    #[serde(default)]
    pub families: BTreeMap<String, FamilyConfig>,
}

/// Runner configuration for executable invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Timeout for a single invocation (e.g., "60s", "5m")
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// Wait between SIGTERM and SIGKILL on timeout (e.g., "500ms")
    #[serde(default = "default_grace_period")]
    pub grace_period: String,
    /// Directory holding the family executables
    #[serde(default = "default_bin_dir")]
    pub bin_dir: String,
    /// Prehash convention for families that support it
    #[serde(default)]
    pub prehash_convention: PrehashConvention,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            grace_period: default_grace_period(),
            bin_dir: default_bin_dir(),
            prehash_convention: PrehashConvention::default(),
        }
    }
}

fn default_timeout() -> String {
    "60s".to_string()
}
fn default_grace_period() -> String {
    "500ms".to_string()
}
fn default_bin_dir() -> String {
    ".".to_string()
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the per-family CSV files are written to
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// File-name suffix after the family id
    #[serde(default = "default_suffix")]
    pub suffix: String,
    /// Write a JSON run summary to this path
    #[serde(default)]
    pub summary: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            suffix: default_suffix(),
            summary: None,
        }
    }
}

fn default_output_dir() -> String {
    ".".to_string()
}
fn default_suffix() -> String {
    pqbench_report::DEFAULT_SUFFIX.to_string()
}

/// What to do with a row whose report carries the failure marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum VerificationPolicy {
    /// Keep the row and count the failure (default)
    #[default]
    Record,
    /// Drop the row and count the failure
    Discard,
}

/// Verification configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VerificationConfig {
    /// Row handling on a verification-failure marker
    #[serde(default)]
    pub policy: VerificationPolicy,
}

/// Per-family configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FamilyConfig {
    /// Executable path, relative to `runner.bin_dir` unless absolute
    #[serde(default)]
    pub executable: Option<String>,
    /// Overrides `runner.prehash_convention` for this family
    #[serde(default)]
    pub prehash_convention: Option<PrehashConvention>,
}

impl PqConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!("ignoring {}: {}", config_path.display(), e);
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Per-family overrides for the strategy table. Unknown family keys are
    /// reported and skipped.
    pub fn family_overrides(&self) -> BTreeMap<Family, FamilyOverrides> {
        let mut overrides = BTreeMap::new();
        for (key, family_config) in &self.families {
            match key.parse::<Family>() {
                Ok(family) => {
                    overrides.insert(
                        family,
                        FamilyOverrides {
                            executable: family_config.executable.as_ref().map(PathBuf::from),
                            convention: family_config.prehash_convention,
                        },
                    );
                }
                Err(e) => tracing::warn!("[families.{}] ignored: {}", key, e),
            }
        }
        overrides
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# PQBench Configuration

[runner]
# Timeout for a single executable invocation
timeout = "60s"
# Wait between SIGTERM and SIGKILL once the timeout expires
grace_period = "500ms"
# Directory holding the ML-DSA, XMSS and SLH-DSA executables
bin_dir = "."
# How the prehash mode is passed: "positional" or "name-embedding"
prehash_convention = "positional"

[output]
# Directory for the <FAMILY>_Resultados.csv files
directory = "."
suffix = "_Resultados.csv"
# JSON run summary (uncomment to enable)
# summary = "pqbench-summary.json"

[verification]
# Row handling when a report says "Firma Errónea.": "record" or "discard"
policy = "record"

[report]
# Value written for fields missing from a report
sentinel = -1
# failure_marker = "Firma Errónea."

# Per-family overrides (uncomment to enable)
# [families.SLH-DSA]
# executable = "SLH-DSA"
# prehash_convention = "name-embedding"
"#
        .to_string()
    }

    /// Parse duration string (e.g., "3s", "500ms", "2m") to nanoseconds
    pub fn parse_duration(s: &str) -> anyhow::Result<u64> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        // Find where the number ends and unit begins
        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;

        let multiplier: u64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" | "" => 1_000_000_000,
            "m" | "min" => 60_000_000_000,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Ok((value * multiplier as f64) as u64)
    }

    /// [`Self::parse_duration`] as a [`Duration`]
    pub fn duration(s: &str) -> anyhow::Result<Duration> {
        Ok(Duration::from_nanos(Self::parse_duration(s)?))
    }
}
