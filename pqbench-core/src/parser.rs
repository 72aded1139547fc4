//! Report Parsing
//!
//! Extracts stage timings, cycle counts and sizes from the free-text report an
//! executable prints on stdout.
//!
//! ## Report Contract
//!
//! ```text
//! RESULTADOS DE GENERACIÓN DE CLAVES        ← stage header
//! Tiempo de ejecución: 0.002s               ← first time in section
//! Ciclos de CPU: 5000 ciclos                ← first cycle count in section
//! Tamaño de la clave pública: 32 bytes      ← size labels, anywhere
//! Tamaño de la clave privada: 64 bytes
//! RESULTADOS DE GENERACIÓN DE FIRMA
//! ...
//! Firma Errónea.                            ← failure marker, any line
//! RESULTADOS DE VERIFICACIÓN DE FIRMA
//! ...
//! ```
//!
//! A section runs from its header to the next stage header after it. Absent
//! sections and labels never abort the parse: the field takes the sentinel
//! value and a [`ParseAnomaly`] is recorded.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::CoreError;

/// Measured stage of a signature scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Key generation
    Keygen,
    /// Signing
    Sign,
    /// Verification
    Verify,
}

impl Stage {
    /// Stages in report order
    pub const ALL: [Stage; 3] = [Stage::Keygen, Stage::Sign, Stage::Verify];

    fn index(self) -> usize {
        match self {
            Stage::Keygen => 0,
            Stage::Sign => 1,
            Stage::Verify => 2,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Keygen => f.write_str("keygen"),
            Stage::Sign => f.write_str("sign"),
            Stage::Verify => f.write_str("verify"),
        }
    }
}

/// Size field located anywhere in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeField {
    /// Public key bytes
    PublicKey,
    /// Private key bytes
    PrivateKey,
    /// Signature bytes
    Signature,
}

impl fmt::Display for SizeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeField::PublicKey => f.write_str("public key size"),
            SizeField::PrivateKey => f.write_str("private key size"),
            SizeField::Signature => f.write_str("signature size"),
        }
    }
}

/// Something the report was expected to contain but did not
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAnomaly {
    /// Stage header not found
    #[error("missing {0} section")]
    MissingSection(Stage),

    /// Stage section without a time line
    #[error("missing elapsed time in {0} section")]
    MissingTime(Stage),

    /// Stage section without a cycle line
    #[error("missing cycle count in {0} section")]
    MissingCycles(Stage),

    /// Size label not found
    #[error("missing {0}")]
    MissingSize(SizeField),
}

/// Labels and markers of the report text.
///
/// Defaults match the executables' Spanish output. Labels are matched
/// literally and followed by `:`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportContract {
    /// Header opening the key-generation section
    pub keygen_header: String,
    /// Header opening the signing section
    pub sign_header: String,
    /// Header opening the verification section
    pub verify_header: String,
    /// Elapsed time label
    pub time_label: String,
    /// Cycle count label
    pub cycles_label: String,
    /// Public key size label
    pub public_key_label: String,
    /// Private key size label
    pub private_key_label: String,
    /// Signature size label
    pub signature_label: String,
    /// Text signalling a failed verification
    pub failure_marker: String,
    /// Value for absent fields
    pub sentinel: i64,
}

impl Default for ReportContract {
    fn default() -> Self {
        Self {
            keygen_header: "RESULTADOS DE GENERACIÓN DE CLAVES".to_string(),
            sign_header: "RESULTADOS DE GENERACIÓN DE FIRMA".to_string(),
            verify_header: "RESULTADOS DE VERIFICACIÓN DE FIRMA".to_string(),
            time_label: "Tiempo de ejecución".to_string(),
            cycles_label: "Ciclos de CPU".to_string(),
            public_key_label: "Tamaño de la clave pública".to_string(),
            private_key_label: "Tamaño de la clave privada".to_string(),
            signature_label: "Tamaño de la firma".to_string(),
            failure_marker: "Firma Errónea.".to_string(),
            sentinel: -1,
        }
    }
}

impl ReportContract {
    fn header(&self, stage: Stage) -> &str {
        match stage {
            Stage::Keygen => &self.keygen_header,
            Stage::Sign => &self.sign_header,
            Stage::Verify => &self.verify_header,
        }
    }
}

/// Elapsed time and cycles of one stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageMetrics {
    /// Seconds
    pub time_secs: f64,
    /// CPU cycles
    pub cycles: i64,
}

/// Everything extracted from one report
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReport {
    /// Key generation
    pub keygen: StageMetrics,
    /// Signing
    pub sign: StageMetrics,
    /// Verification
    pub verify: StageMetrics,
    /// Public key bytes
    pub public_key_bytes: i64,
    /// Private key bytes
    pub private_key_bytes: i64,
    /// Signature bytes
    pub signature_bytes: i64,
    /// Failure marker seen on some line
    pub verification_failed: bool,
    /// Fields replaced by the sentinel
    pub anomalies: Vec<ParseAnomaly>,
}

impl ParsedReport {
    /// Metrics of `stage`
    pub fn stage(&self, stage: Stage) -> StageMetrics {
        match stage {
            Stage::Keygen => self.keygen,
            Stage::Sign => self.sign,
            Stage::Verify => self.verify,
        }
    }

    /// No field fell back to the sentinel
    pub fn is_complete(&self) -> bool {
        self.anomalies.is_empty()
    }
}

/// Compiled parser for a [`ReportContract`]
#[derive(Debug, Clone)]
pub struct ReportParser {
    contract: ReportContract,
    time: Regex,
    cycles: Regex,
    public_key: Regex,
    private_key: Regex,
    signature: Regex,
}

const FLOAT_TOKEN: &str = r"([0-9]+(?:\.[0-9]*)?(?:[eE][-+]?[0-9]+)?)";
const INT_TOKEN: &str = r"([0-9]+)";

fn labeled(label: &str, token: &str) -> Result<Regex, CoreError> {
    let pattern = format!(r"{}:\s*{}", regex::escape(label), token);
    Regex::new(&pattern).map_err(|e| CoreError::InvalidPattern(e.to_string()))
}

impl ReportParser {
    /// Compile the label patterns of `contract`
    pub fn new(contract: ReportContract) -> Result<Self, CoreError> {
        Ok(Self {
            time: labeled(&contract.time_label, FLOAT_TOKEN)?,
            cycles: labeled(&contract.cycles_label, INT_TOKEN)?,
            public_key: labeled(&contract.public_key_label, INT_TOKEN)?,
            private_key: labeled(&contract.private_key_label, INT_TOKEN)?,
            signature: labeled(&contract.signature_label, INT_TOKEN)?,
            contract,
        })
    }

    /// Contract this parser was built from
    pub fn contract(&self) -> &ReportContract {
        &self.contract
    }

    /// Parse a report. Never fails; see [`ParsedReport::anomalies`].
    pub fn parse(&self, text: &str) -> ParsedReport {
        let mut anomalies = Vec::new();
        let sections = self.sections(text);

        let mut stages = [StageMetrics {
            time_secs: self.contract.sentinel as f64,
            cycles: self.contract.sentinel,
        }; 3];

        for stage in Stage::ALL {
            let Some(section) = sections[stage.index()] else {
                anomalies.push(ParseAnomaly::MissingSection(stage));
                continue;
            };
            let metrics = &mut stages[stage.index()];

            match first_capture(&self.time, section).and_then(|s| s.parse::<f64>().ok()) {
                Some(secs) => metrics.time_secs = secs,
                None => anomalies.push(ParseAnomaly::MissingTime(stage)),
            }
            match first_capture(&self.cycles, section).and_then(|s| s.parse::<i64>().ok()) {
                Some(cycles) => metrics.cycles = cycles,
                None => anomalies.push(ParseAnomaly::MissingCycles(stage)),
            }
        }

        let mut size = |re: &Regex, field: SizeField| {
            first_capture(re, text)
                .and_then(|s| s.parse::<i64>().ok())
                .unwrap_or_else(|| {
                    anomalies.push(ParseAnomaly::MissingSize(field));
                    self.contract.sentinel
                })
        };
        let public_key_bytes = size(&self.public_key, SizeField::PublicKey);
        let private_key_bytes = size(&self.private_key, SizeField::PrivateKey);
        let signature_bytes = size(&self.signature, SizeField::Signature);

        let marker = self.contract.failure_marker.as_str();
        let verification_failed =
            !marker.is_empty() && text.lines().any(|line| line.contains(marker));

        let [keygen, sign, verify] = stages;
        ParsedReport {
            keygen,
            sign,
            verify,
            public_key_bytes,
            private_key_bytes,
            signature_bytes,
            verification_failed,
            anomalies,
        }
    }

    /// Body of each stage section, indexed by [`Stage::index`]
    fn sections<'t>(&self, text: &'t str) -> [Option<&'t str>; 3] {
        let starts: Vec<Option<(usize, usize)>> = Stage::ALL
            .iter()
            .map(|&stage| {
                let header = self.contract.header(stage);
                text.find(header).map(|at| (at, at + header.len()))
            })
            .collect();

        let mut sections = [None; 3];
        for (index, start) in starts.iter().enumerate() {
            let Some((_, body_start)) = *start else {
                continue;
            };
            let end = starts
                .iter()
                .flatten()
                .map(|&(header_start, _)| header_start)
                .filter(|&header_start| header_start >= body_start)
                .min()
                .unwrap_or(text.len());
            sections[index] = Some(&text[body_start..end]);
        }
        sections
    }
}

fn first_capture<'t>(re: &Regex, haystack: &'t str) -> Option<&'t str> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "\
EVALUACIÓN DE RENDIMIENTO DEL ALGORITMO SLH-DSA
SET DE PARÁMETROS UTILIZADOS: SLH-DSA-SHA2-128s
Pre-Hash: No


RESULTADOS DE GENERACIÓN DE CLAVES
Tiempo de ejecución: 0.002s
Ciclos de CPU: 5000 ciclos
Tamaño de la clave pública: 32 bytes
Tamaño de la clave privada: 64 bytes


RESULTADOS DE GENERACIÓN DE FIRMA
Tiempo de ejecución: 0.010s
Ciclos de CPU: 30000 ciclos
Tamaño de la firma: 7856 bytes


Firma Verificada.
RESULTADOS DE VERIFICACIÓN DE FIRMA
Tiempo de ejecución: 0.001s
Ciclos de CPU: 2000 ciclos
";

    fn parser() -> ReportParser {
        ReportParser::new(ReportContract::default()).unwrap()
    }

    #[test]
    fn test_parses_well_formed_report() {
        let report = parser().parse(WELL_FORMED);
        assert!(report.is_complete(), "{:?}", report.anomalies);
        assert_eq!(report.keygen.time_secs, 0.002);
        assert_eq!(report.keygen.cycles, 5000);
        assert_eq!(report.sign.time_secs, 0.010);
        assert_eq!(report.sign.cycles, 30000);
        assert_eq!(report.verify.time_secs, 0.001);
        assert_eq!(report.verify.cycles, 2000);
        assert_eq!(report.public_key_bytes, 32);
        assert_eq!(report.private_key_bytes, 64);
        assert_eq!(report.signature_bytes, 7856);
        assert!(!report.verification_failed);
    }

    #[test]
    fn test_missing_section_yields_sentinels() {
        let text = WELL_FORMED.replace("RESULTADOS DE GENERACIÓN DE FIRMA", "OTRA COSA");
        let report = parser().parse(&text);
        assert_eq!(report.sign.time_secs, -1.0);
        assert_eq!(report.sign.cycles, -1);
        assert!(report.anomalies.contains(&ParseAnomaly::MissingSection(Stage::Sign)));
        // Sizes are located independently of sections.
        assert_eq!(report.signature_bytes, 7856);
    }

    #[test]
    fn test_keygen_section_ends_at_next_header() {
        let text = WELL_FORMED.replace("Tiempo de ejecución: 0.002s\n", "");
        let report = parser().parse(&text);
        assert_eq!(report.keygen.time_secs, -1.0);
        assert_eq!(report.keygen.cycles, 5000);
        assert_eq!(report.anomalies, vec![ParseAnomaly::MissingTime(Stage::Keygen)]);
    }

    #[test]
    fn test_missing_size_label_uses_sentinel() {
        let text = WELL_FORMED.replace("Tamaño de la clave privada: 64 bytes\n", "");
        let report = parser().parse(&text);
        assert_eq!(report.private_key_bytes, -1);
        assert_eq!(
            report.anomalies,
            vec![ParseAnomaly::MissingSize(SizeField::PrivateKey)]
        );
    }

    #[test]
    fn test_empty_report_keeps_full_arity() {
        let report = parser().parse("");
        assert_eq!(report.anomalies.len(), 6);
        for stage in Stage::ALL {
            assert_eq!(report.stage(stage).cycles, -1);
        }
    }

    #[test]
    fn test_exponent_times_are_read_whole() {
        let text = WELL_FORMED.replace("0.001s", "2.1e-05s");
        let report = parser().parse(&text);
        assert!((report.verify.time_secs - 2.1e-05).abs() < 1e-12);
    }

    #[test]
    fn test_failure_marker_is_detected() {
        let text = WELL_FORMED.replace("Firma Verificada.", "Firma Errónea.");
        let report = parser().parse(&text);
        assert!(report.verification_failed);
        assert!(report.is_complete());
    }

    #[test]
    fn test_custom_contract_and_sentinel() {
        let contract = ReportContract {
            keygen_header: "KEYGEN".to_string(),
            sign_header: "SIGN".to_string(),
            verify_header: "VERIFY".to_string(),
            time_label: "time".to_string(),
            cycles_label: "cycles".to_string(),
            sentinel: 0,
            ..Default::default()
        };
        let parser = ReportParser::new(contract).unwrap();
        let report = parser.parse("KEYGEN\ntime: 1.5\ncycles: 10\nSIGN\ntime: 2\n");
        assert_eq!(report.keygen.time_secs, 1.5);
        assert_eq!(report.keygen.cycles, 10);
        assert_eq!(report.sign.time_secs, 2.0);
        assert_eq!(report.sign.cycles, 0);
        assert_eq!(report.verify.time_secs, 0.0);
    }
}
