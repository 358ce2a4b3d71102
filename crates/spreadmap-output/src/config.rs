//! Presentation settings.

use serde::{Deserialize, Serialize};

/// Output configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Ranked pairs listed under a matrix (default: 20)
    pub top_pairs: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { top_pairs: 20 }
    }
}
