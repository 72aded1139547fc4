//! CSV Output
//!
//! One file per family, named `<FAMILY>_Resultados.csv`.

use pqbench_core::Family;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::row::{HEADER, ResultSet};

/// Default file-name suffix appended to the family identifier
/// Appended to the family id to name its CSV file
pub const DEFAULT_SUFFIX: &str = "_Resultados.csv";

/// Errors raised while exporting a result set
#[derive(Debug, Error)]
pub enum ReportError {
    /// Creating the directory or file failed
    #[error("I/O error writing {path}: {source}")]
    Io {
        /// Target file or directory
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Serializing a row failed
    #[error("CSV error writing {path}: {source}")]
    Csv {
        /// Target file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: ::csv::Error,
    },
}

/// Writes finalized result sets to family-named CSV files
#[derive(Debug, Clone)]
pub struct ReportWriter {
    directory: PathBuf,
    suffix: String,
}

impl ReportWriter {
    /// Writer targeting `directory` with the default suffix
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }

    /// Use a different file-name suffix
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Output directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path the file for `family` is written to
    pub fn path_for(&self, family: Family) -> PathBuf {
        self.directory.join(format!("{}{}", family.id(), self.suffix))
    }

    /// Write the header and every row of `set`, in insertion order.
    ///
    /// The directory is created when missing. Returns the written path.
    pub fn write(&self, set: &ResultSet) -> Result<PathBuf, ReportError> {
        let path = self.path_for(set.family);

        std::fs::create_dir_all(&self.directory).map_err(|source| ReportError::Io {
            path: self.directory.clone(),
            source,
        })?;

        let csv_err = |source| ReportError::Csv {
            path: path.clone(),
            source,
        };

        let mut writer = ::csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .map_err(csv_err)?;
        writer.write_record(HEADER).map_err(csv_err)?;
        for row in &set.rows {
            writer.serialize(row).map_err(csv_err)?;
        }
        writer.flush().map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}
