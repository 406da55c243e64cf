//! Export of reports to disk.
//!
//! Reports are written as XLSX by default, with CSV and JSON available for
//! downstream tooling. Artifacts carry their generation timestamp in the file
//! name and are created with `create_new`, so an earlier report is never
//! overwritten.

use crate::report::Report;
use crate::xlsx::report_to_xlsx;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// XLSX generation error.
    #[error("XLSX generation error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The output directory could not be created.
    #[error("cannot create output directory {}: {source}", path.display())]
    OutputDir {
        /// Directory that was requested
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// Excel workbook, one worksheet per category.
    #[default]
    Xlsx,

    /// Comma-separated values, one flat table.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::PrettyJson => "pretty-json",
        })
    }
}

/// Flattened report row for CSV export.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    category: &'a str,
    amc: &'a str,
    scheme_name: &'a str,
    scheme_code: &'a str,
    t0_date: Option<NaiveDate>,
    t0_nav: Option<f64>,
    t1_date: Option<NaiveDate>,
    t1_nav: Option<f64>,
    annualised_return: Option<f64>,
    annualised_return_pct: String,
    status: String,
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to bytes in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_bytes(&self, format: ExportFormat) -> Result<Vec<u8>, ExportError>;

    /// Export data to a new file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails, the file already exists, or
    /// writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_bytes(format)?;
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        file.write_all(&content)?;
        file.sync_all()?;
        Ok(())
    }
}

impl Exporter for Report {
    fn export_to_bytes(&self, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        match format {
            ExportFormat::Xlsx => Ok(report_to_xlsx(self)?),
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for row in self.rows() {
                    wtr.serialize(CsvRow {
                        category: &row.category,
                        amc: &row.amc,
                        scheme_name: &row.scheme_name,
                        scheme_code: row.scheme_code.as_str(),
                        t0_date: row.t0_date,
                        t0_nav: row.t0_nav,
                        t1_date: row.t1_date,
                        t1_nav: row.t1_nav,
                        annualised_return: row.annualised_return,
                        annualised_return_pct: row.return_display(),
                        status: row
                            .missing
                            .map_or_else(|| "computed".to_string(), |r| r.to_string()),
                    })?;
                }
                wtr.into_inner().map_err(|e| ExportError::Io(e.into_error()))
            }
            ExportFormat::Json => Ok(serde_json::to_vec(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_vec_pretty(self)?),
        }
    }
}

/// First path of the form `dir/stem.ext`, `dir/stem-1.ext`, ... that does not exist.
fn unique_artifact_path(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    let mut candidate = dir.join(format!("{stem}.{extension}"));
    let mut n = 1;
    while candidate.exists() {
        candidate = dir.join(format!("{stem}-{n}.{extension}"));
        n += 1;
    }
    candidate
}

/// Write `report` into `output_dir`, creating the directory if needed.
///
/// Returns the path of the new artifact.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the artifact
/// cannot be generated or written.
pub fn write_report(
    report: &Report,
    output_dir: &Path,
    format: ExportFormat,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(output_dir).map_err(|source| ExportError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let path = unique_artifact_path(output_dir, &report.file_stem(), format.extension());
    report.export_to_file(&path, format)?;

    tracing::info!(path = %path.display(), %format, rows = report.row_count(), "report written");
    Ok(path)
}
