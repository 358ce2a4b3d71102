//! JSON report for an attribution run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Attribution report between two observation dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report title.
    pub title: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Start column label.
    pub start: String,

    /// End column label.
    pub end: String,

    /// Report contents (JSON format).
    pub contents: serde_json::Value,
}

impl Report {
    /// Create a new report stamped with the current time.
    pub fn new(title: String, start: String, end: String, contents: serde_json::Value) -> Self {
        Self {
            title,
            timestamp: Utc::now(),
            start,
            end,
            contents,
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the pretty JSON form to `path`.
    pub fn write_to(&self, path: &Path) -> Result<(), ReportError> {
        let mut file = File::create(path)?;
        file.write_all(self.to_json()?.as_bytes())?;
        Ok(())
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    title: Option<String>,
    period: Option<(String, String)>,
    contents: Option<serde_json::Value>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the start and end column labels.
    pub fn period(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.period = Some((start.into(), end.into()));
        self
    }

    /// Set the report contents from any serializable value.
    pub fn contents<T: Serialize>(mut self, contents: &T) -> Result<Self, ReportError> {
        self.contents = Some(serde_json::to_value(contents)?);
        Ok(self)
    }

    /// Build the report.
    pub fn build(self) -> Report {
        let (start, end) = self.period.unwrap_or_default();
        Report::new(
            self.title
                .unwrap_or_else(|| "Spread P/L Attribution".to_string()),
            start,
            end,
            self.contents.unwrap_or(serde_json::Value::Null),
        )
    }
}
