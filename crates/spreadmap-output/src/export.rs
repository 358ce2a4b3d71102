//! CSV and JSON export of positions, ranked pairs and matrices.

use serde::Serialize;
use spreadmap_engine::{ContributionMatrix, PositionChange, RankedPair};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer produced non UTF-8 output.
    #[error("Encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
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
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "pretty" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(value)?),
        _ => Ok(serde_json::to_string(value)?),
    }
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn records_to_csv<T: Serialize>(records: &[T]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)?;
    }
    finish(wtr)
}

impl Exporter for [PositionChange] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => records_to_csv(self),
            _ => to_json(self, format),
        }
    }
}

impl Exporter for [RankedPair] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => records_to_csv(self),
            _ => to_json(self, format),
        }
    }
}

/// Grid layout: a `contract` column then one column per contract; the
/// diagonal is left empty. JSON keeps `null` there.
impl Exporter for ContributionMatrix {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                let mut header = vec!["contract"];
                header.extend(self.contracts().iter().map(|c| c.as_str()));
                wtr.write_record(&header)?;

                for (row, contract) in self.contracts().iter().enumerate() {
                    let mut record = vec![contract.as_str().to_string()];
                    record.extend((0..self.len()).map(|col| {
                        self.get(row, col)
                            .map(|v| v.to_string())
                            .unwrap_or_default()
                    }));
                    wtr.write_record(&record)?;
                }
                finish(wtr)
            }
            _ => to_json(self, format),
        }
    }
}
