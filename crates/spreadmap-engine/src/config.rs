//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Tolerances used by the diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Largest absolute quantity sum still treated as a flat book (default: 0.01)
    pub quantity_tolerance: f64,

    /// Relative tolerance for matrix/strategy reconciliation (default: 1e-6)
    pub reconciliation_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quantity_tolerance: 0.01,
            reconciliation_tolerance: 1e-6,
        }
    }
}
