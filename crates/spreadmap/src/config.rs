//! Application configuration.
//!
//! One JSON document with optional `loader`, `engine` and `output`
//! sections. Anything left out takes its default:
//!
//! ```json
//! {
//!   "loader": { "thousands_separator": ",", "start_column": "2024-01-31" },
//!   "engine": { "reconciliation_tolerance": 1e-4 },
//!   "output": { "top_pairs": 10 }
//! }
//! ```

use crate::analysis::AnalysisError;
use serde::{Deserialize, Serialize};
use spreadmap_data::LoaderConfig;
use spreadmap_engine::EngineConfig;
use spreadmap_output::OutputConfig;
use std::fs;
use std::path::Path;

/// Settings for every stage of an analysis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Sheet parsing and date column selection.
    pub loader: LoaderConfig,

    /// Diagnostic tolerances.
    pub engine: EngineConfig,

    /// Presentation.
    pub output: OutputConfig,
}

impl AppConfig {
    /// Parse a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        serde_json::from_str(json).map_err(AnalysisError::Config)
    }

    /// Read and parse a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Self::from_json(&contents)
    }
}
