//! Which quantity snapshot drives a calculation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position strategy.
///
/// `Hold` keeps the start-date position for the whole period; `Actual` uses
/// the position held at the end date. Both are applied to the same price move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Start-date quantities
    Hold,
    /// End-date quantities
    Actual,
}

impl Strategy {
    /// Both strategies, Hold first.
    pub const ALL: [Self; 2] = [Self::Hold, Self::Actual];

    /// Short display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hold => "Hold",
            Self::Actual => "Actual",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
