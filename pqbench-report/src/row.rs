//! Metric rows and per-family result sets

use pqbench_core::{ExecutionRequest, Family, ParsedReport};
use serde::{Deserialize, Serialize};

/// Column header of every exported table, in row order
pub const HEADER: [&str; MetricRow::ARITY] = [
    "Parametro",
    "Prehash",
    "Keygen_tiempo",
    "Keygen_ciclos",
    "Tamaño_clave_pub",
    "Tamaño_clave_priv",
    "Firma_tiempo",
    "Firma_ciclos",
    "Tamaño_firma",
    "Verificacion_tiempo",
    "Verificacion_ciclos",
    "Tiempo_total",
    "Ciclos_totales",
];

/// Measurements of one execution before totals are computed
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredRow {
    /// Variant name
    pub variant: String,
    /// `Sí` / `No`
    pub prehash: String,
    /// Keygen seconds
    pub keygen_time: f64,
    /// Keygen cycles
    pub keygen_cycles: i64,
    /// Public key bytes
    pub public_key_bytes: i64,
    /// Private key bytes
    pub private_key_bytes: i64,
    /// Signing seconds
    pub sign_time: f64,
    /// Signing cycles
    pub sign_cycles: i64,
    /// Signature bytes
    pub signature_bytes: i64,
    /// Verification seconds
    pub verify_time: f64,
    /// Verification cycles
    pub verify_cycles: i64,
    /// The report carried the verification-failure marker
    pub verification_failed: bool,
}

impl MeasuredRow {
    /// Row for `request` from its parsed report
    pub fn from_parsed(request: &ExecutionRequest, report: &ParsedReport) -> Self {
        Self {
            variant: request.variant.name.clone(),
            prehash: request.mode_label().to_string(),
            keygen_time: report.keygen.time_secs,
            keygen_cycles: report.keygen.cycles,
            public_key_bytes: report.public_key_bytes,
            private_key_bytes: report.private_key_bytes,
            sign_time: report.sign.time_secs,
            sign_cycles: report.sign.cycles,
            signature_bytes: report.signature_bytes,
            verify_time: report.verify.time_secs,
            verify_cycles: report.verify.cycles,
            verification_failed: report.verification_failed,
        }
    }
}

/// Finalized row: the measurements plus both totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    /// Variant name
    #[serde(rename = "Parametro")]
    pub variant: String,
    /// `Sí` / `No`
    #[serde(rename = "Prehash")]
    pub prehash: String,
    /// Keygen seconds
    #[serde(rename = "Keygen_tiempo")]
    pub keygen_time: f64,
    /// Keygen cycles
    #[serde(rename = "Keygen_ciclos")]
    pub keygen_cycles: i64,
    /// Public key bytes
    #[serde(rename = "Tamaño_clave_pub")]
    pub public_key_bytes: i64,
    /// Private key bytes
    #[serde(rename = "Tamaño_clave_priv")]
    pub private_key_bytes: i64,
    /// Signing seconds
    #[serde(rename = "Firma_tiempo")]
    pub sign_time: f64,
    /// Signing cycles
    #[serde(rename = "Firma_ciclos")]
    pub sign_cycles: i64,
    /// Signature bytes
    #[serde(rename = "Tamaño_firma")]
    pub signature_bytes: i64,
    /// Verification seconds
    #[serde(rename = "Verificacion_tiempo")]
    pub verify_time: f64,
    /// Verification cycles
    #[serde(rename = "Verificacion_ciclos")]
    pub verify_cycles: i64,
    /// Sum of the three stage times
    #[serde(rename = "Tiempo_total")]
    pub total_time: f64,
    /// Wider than the stages so the sum is always exact
    #[serde(rename = "Ciclos_totales")]
    pub total_cycles: i128,
    /// Not exported; kept for summaries
    #[serde(skip)]
    pub verification_failed: bool,
}

impl MetricRow {
    /// Number of exported fields
    pub const ARITY: usize = 13;

    /// Compute totals as the sum of the three stages.
    ///
    /// Sentinel values take part in the sum like any other value. The time
    /// total is rounded to 15 significant digits so that decimal stage times
    /// add up to their decimal total.
    pub fn finalize(row: MeasuredRow) -> Self {
        let total_time =
            round_significant(row.keygen_time + row.sign_time + row.verify_time);
        let total_cycles = i128::from(row.keygen_cycles)
            + i128::from(row.sign_cycles)
            + i128::from(row.verify_cycles);
        Self {
            variant: row.variant,
            prehash: row.prehash,
            keygen_time: row.keygen_time,
            keygen_cycles: row.keygen_cycles,
            public_key_bytes: row.public_key_bytes,
            private_key_bytes: row.private_key_bytes,
            sign_time: row.sign_time,
            sign_cycles: row.sign_cycles,
            signature_bytes: row.signature_bytes,
            verify_time: row.verify_time,
            verify_cycles: row.verify_cycles,
            total_time,
            total_cycles,
            verification_failed: row.verification_failed,
        }
    }
}

/// Round to the 15 significant digits every f64 holds exactly
fn round_significant(value: f64) -> f64 {
    if !value.is_finite() || value == 0.0 {
        return value;
    }
    format!("{:.14e}", value).parse().unwrap_or(value)
}

/// Finalized rows of one family, in catalog order
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    /// Owning family
    pub family: Family,
    /// Rows in insertion order
    pub rows: Vec<MetricRow>,
}

impl ResultSet {
    /// Empty set for `family`
    pub fn new(family: Family) -> Self {
        Self {
            family,
            rows: Vec::new(),
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// No rows recorded
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
