//! Hold vs Actual decomposition.
//!
//! ```text
//! total_hold   = Σ hold_pl
//! total_actual = Σ actual_pl
//! effect       = total_actual - total_hold
//! ```
//!
//! The effect is also checked against the contribution matrices: the
//! change in total spread P/L between the Actual and Hold matrices should
//! explain it.

use crate::error::{EngineError, Result};
use crate::matrix::{ContributionMatrix, MatrixMode};
use crate::position::PositionChange;
use serde::{Deserialize, Serialize};
use spreadmap_data::ContractId;
use std::fmt;

/// Per-contract share of the strategy effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractEffect {
    /// Contract label.
    pub contract: ContractId,
    /// Hold P/L.
    pub hold_pl: f64,
    /// Actual P/L.
    pub actual_pl: f64,
    /// `actual_pl - hold_pl`.
    pub effect: f64,
}

/// How a waterfall bar is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    /// Bar from zero
    Absolute,
    /// Bar stacked on the previous level
    Relative,
    /// Running total
    Total,
}

/// Waterfall bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterfallStage {
    /// Hold total
    Hold,
    /// Position change effect
    StrategyEffect,
    /// Actual total
    Actual,
}

impl fmt::Display for WaterfallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Hold => "Hold P/L",
            Self::StrategyEffect => "Strategy Effect",
            Self::Actual => "Actual P/L",
        })
    }
}

/// One waterfall bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterfallStep {
    /// Which bar.
    pub stage: WaterfallStage,
    /// How it is drawn.
    pub measure: Measure,
    /// Bar value.
    pub value: f64,
}

/// Portfolio totals under both strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyDecomposition {
    /// Σ hold_pl.
    pub total_hold: f64,

    /// Σ actual_pl.
    pub total_actual: f64,

    /// `total_actual - total_hold`.
    pub effect: f64,

    /// Per-contract breakdown, in input order.
    pub breakdown: Vec<ContractEffect>,
}

impl StrategyDecomposition {
    /// Aggregate per-contract changes.
    ///
    /// # Examples
    ///
    /// ```
    /// use spreadmap_data::Snapshot;
    /// use spreadmap_engine::{PositionChange, StrategyDecomposition};
    ///
    /// let positions = vec![
    ///     PositionChange::from_snapshots(
    ///         "Cash".into(),
    ///         Snapshot::new(100.0, 1000.0),
    ///         Snapshot::new(50.0, 1050.0),
    ///     ),
    ///     PositionChange::from_snapshots(
    ///         "3M".into(),
    ///         Snapshot::new(-100.0, 980.0),
    ///         Snapshot::new(-50.0, 1000.0),
    ///     ),
    /// ];
    ///
    /// let decomposition = StrategyDecomposition::compute(&positions);
    /// assert_eq!(decomposition.total_hold, 3000.0);
    /// assert_eq!(decomposition.total_actual, 1500.0);
    /// assert_eq!(decomposition.effect, -1500.0);
    /// ```
    pub fn compute(positions: &[PositionChange]) -> Self {
        let total_hold: f64 = positions.iter().map(|p| p.hold_pl).sum();
        let total_actual: f64 = positions.iter().map(|p| p.actual_pl).sum();

        let breakdown = positions
            .iter()
            .map(|p| ContractEffect {
                contract: p.contract.clone(),
                hold_pl: p.hold_pl,
                actual_pl: p.actual_pl,
                effect: p.effect(),
            })
            .collect();

        Self {
            total_hold,
            total_actual,
            effect: total_actual - total_hold,
            breakdown,
        }
    }

    /// Hold (absolute) → effect (relative) → Actual (total).
    pub const fn waterfall(&self) -> [WaterfallStep; 3] {
        [
            WaterfallStep {
                stage: WaterfallStage::Hold,
                measure: Measure::Absolute,
                value: self.total_hold,
            },
            WaterfallStep {
                stage: WaterfallStage::StrategyEffect,
                measure: Measure::Relative,
                value: self.effect,
            },
            WaterfallStep {
                stage: WaterfallStage::Actual,
                measure: Measure::Total,
                value: self.total_actual,
            },
        ]
    }

    /// Compare the effect with `actual.total() - hold.total()`.
    ///
    /// # Errors
    ///
    /// [`EngineError::ModeMismatch`] if the matrices are not a Hold and an
    /// Actual matrix.
    pub fn reconcile(
        &self,
        hold: &ContributionMatrix,
        actual: &ContributionMatrix,
        tolerance: f64,
    ) -> Result<Reconciliation> {
        for (matrix, expected) in [(hold, MatrixMode::Hold), (actual, MatrixMode::Actual)] {
            if matrix.mode() != expected {
                return Err(EngineError::ModeMismatch {
                    expected,
                    actual: matrix.mode(),
                });
            }
        }

        let matrix_effect = actual.total() - hold.total();
        let reconciliation = Reconciliation {
            matrix_effect,
            strategy_effect: self.effect,
            residual: matrix_effect - self.effect,
            tolerance,
        };
        if !reconciliation.is_reconciled() {
            tracing::warn!(
                matrix_effect,
                strategy_effect = self.effect,
                residual = reconciliation.residual,
                "spread matrices do not explain the strategy effect"
            );
        }
        Ok(reconciliation)
    }
}

/// Outcome of comparing matrix totals with the strategy effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// `actual.total() - hold.total()`.
    pub matrix_effect: f64,

    /// `total_actual - total_hold`.
    pub strategy_effect: f64,

    /// `matrix_effect - strategy_effect`.
    pub residual: f64,

    /// Relative tolerance.
    pub tolerance: f64,
}

impl Reconciliation {
    /// `|residual| <= tolerance * max(1, |strategy_effect|)`.
    pub fn is_reconciled(&self) -> bool {
        self.residual.abs() <= self.tolerance * self.strategy_effect.abs().max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::compute_all;
    use approx::assert_relative_eq;
    use spreadmap_data::{Snapshot, SnapshotTable};

    fn cash_three_month() -> (SnapshotTable, SnapshotTable, Vec<ContractId>) {
        let start = SnapshotTable::from_entries([
            ("Cash", Snapshot::new(100.0, 1000.0)),
            ("3M", Snapshot::new(-100.0, 980.0)),
        ]);
        let end = SnapshotTable::from_entries([
            ("Cash", Snapshot::new(50.0, 1050.0)),
            ("3M", Snapshot::new(-50.0, 1000.0)),
        ]);
        let contracts = start.contracts().cloned().collect();
        (start, end, contracts)
    }

    #[test]
    fn test_breakdown() {
        let (start, end, contracts) = cash_three_month();
        let d = StrategyDecomposition::compute(&compute_all(&start, &end, &contracts));
        assert_eq!(d.breakdown.len(), 2);
        assert_relative_eq!(d.breakdown[0].effect, -2500.0);
        assert_relative_eq!(d.breakdown[1].effect, 1000.0);
        let sum: f64 = d.breakdown.iter().map(|c| c.effect).sum();
        assert_relative_eq!(sum, d.effect);
    }

    #[test]
    fn test_waterfall_order() {
        let (start, end, contracts) = cash_three_month();
        let d = StrategyDecomposition::compute(&compute_all(&start, &end, &contracts));
        let [hold, effect, actual] = d.waterfall();
        assert_eq!(hold.measure, Measure::Absolute);
        assert_eq!(effect.measure, Measure::Relative);
        assert_eq!(actual.measure, Measure::Total);
        assert_relative_eq!(hold.value + effect.value, actual.value);
    }

    #[test]
    fn test_reconciles_cash_three_month() {
        let (start, end, contracts) = cash_three_month();
        let d = StrategyDecomposition::compute(&compute_all(&start, &end, &contracts));
        let hold = ContributionMatrix::build(&start, &end, &contracts, MatrixMode::Hold).unwrap();
        let actual =
            ContributionMatrix::build(&start, &end, &contracts, MatrixMode::Actual).unwrap();
        let r = d.reconcile(&hold, &actual, 1e-6).unwrap();
        assert_relative_eq!(r.matrix_effect, -1500.0);
        assert!(r.is_reconciled());
    }

    #[test]
    fn test_reconcile_rejects_swapped_matrices() {
        let (start, end, contracts) = cash_three_month();
        let d = StrategyDecomposition::compute(&compute_all(&start, &end, &contracts));
        let hold = ContributionMatrix::build(&start, &end, &contracts, MatrixMode::Hold).unwrap();
        let actual =
            ContributionMatrix::build(&start, &end, &contracts, MatrixMode::Actual).unwrap();
        assert!(d.reconcile(&actual, &hold, 1e-6).is_err());
    }

    #[test]
    fn test_unhedged_book_reports_residual() {
        // Two shorts against one long that only covers one of them.
        let start = SnapshotTable::from_entries([
            ("Cash", Snapshot::new(100.0, 1000.0)),
            ("3M", Snapshot::new(-100.0, 990.0)),
            ("M+4", Snapshot::new(-100.0, 985.0)),
        ]);
        let end = SnapshotTable::from_entries([
            ("Cash", Snapshot::new(100.0, 1010.0)),
            ("3M", Snapshot::new(-100.0, 992.0)),
            ("M+4", Snapshot::new(-100.0, 986.0)),
        ]);
        let contracts: Vec<ContractId> = start.contracts().cloned().collect();
        let positions = compute_all(&start, &end, &contracts);
        let d = StrategyDecomposition::compute(&positions);
        let hold = ContributionMatrix::build(&start, &end, &contracts, MatrixMode::Hold).unwrap();
        let actual =
            ContributionMatrix::build(&start, &end, &contracts, MatrixMode::Actual).unwrap();
        let r = d.reconcile(&hold, &actual, 1e-6).unwrap();
        // Positions are unchanged, so both effects are zero.
        assert!(r.is_reconciled());
        assert_relative_eq!(hold.total(), 100.0 * 8.0 + 100.0 * 9.0);
        assert_relative_eq!(d.total_hold, 1000.0 - 200.0 - 100.0);
        assert!((hold.total() - d.total_hold).abs() > 1.0);
    }
}
