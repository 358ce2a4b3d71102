//! Per-contract Hold and Actual P/L.
//!
//! For one contract observed at two dates:
//!
//! ```text
//! price_change = price_end - price_start
//! hold_pl      = qty_start * price_change
//! actual_pl    = qty_end   * price_change
//! ```
//!
//! A contract missing from one of the tables contributes zero quantity and
//! zero price for that date.

use crate::strategy::Strategy;
use serde::{Deserialize, Serialize};
use spreadmap_data::{ContractId, Snapshot, SnapshotTable};

/// P/L of one contract between the start and end dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionChange {
    /// Contract label.
    pub contract: ContractId,

    /// Quantity at the start date.
    pub qty_start: f64,

    /// Quantity at the end date.
    pub qty_end: f64,

    /// Price at the start date.
    pub price_start: f64,

    /// Price at the end date.
    pub price_end: f64,

    /// `price_end - price_start`.
    pub price_change: f64,

    /// `qty_start * price_change`.
    pub hold_pl: f64,

    /// `qty_end * price_change`.
    pub actual_pl: f64,
}

impl PositionChange {
    /// Compute the change for `contract` from two snapshot tables.
    ///
    /// # Examples
    ///
    /// ```
    /// use spreadmap_data::{Snapshot, SnapshotTable};
    /// use spreadmap_engine::PositionChange;
    ///
    /// let start = SnapshotTable::from_entries([("Cash", Snapshot::new(100.0, 1000.0))]);
    /// let end = SnapshotTable::from_entries([("Cash", Snapshot::new(50.0, 1050.0))]);
    ///
    /// let change = PositionChange::compute(&start, &end, &"Cash".into());
    /// assert_eq!(change.hold_pl, 5000.0);
    /// assert_eq!(change.actual_pl, 2500.0);
    /// ```
    pub fn compute(start: &SnapshotTable, end: &SnapshotTable, contract: &ContractId) -> Self {
        Self::from_snapshots(
            contract.clone(),
            start.get_or_default(contract),
            end.get_or_default(contract),
        )
    }

    /// Compute the change from two already resolved snapshots.
    pub fn from_snapshots(contract: ContractId, start: Snapshot, end: Snapshot) -> Self {
        let price_change = end.price - start.price;
        Self {
            contract,
            qty_start: start.quantity,
            qty_end: end.quantity,
            price_start: start.price,
            price_end: end.price,
            price_change,
            hold_pl: start.quantity * price_change,
            actual_pl: end.quantity * price_change,
        }
    }

    /// Quantity the given strategy holds.
    pub const fn quantity(&self, strategy: Strategy) -> f64 {
        match strategy {
            Strategy::Hold => self.qty_start,
            Strategy::Actual => self.qty_end,
        }
    }

    /// P/L under the given strategy.
    pub const fn pl(&self, strategy: Strategy) -> f64 {
        match strategy {
            Strategy::Hold => self.hold_pl,
            Strategy::Actual => self.actual_pl,
        }
    }

    /// `actual_pl - hold_pl`: P/L caused by changing the position.
    pub fn effect(&self) -> f64 {
        self.actual_pl - self.hold_pl
    }
}

/// Compute the change for every contract, in the given order.
pub fn compute_all(
    start: &SnapshotTable,
    end: &SnapshotTable,
    contracts: &[ContractId],
) -> Vec<PositionChange> {
    contracts
        .iter()
        .map(|contract| PositionChange::compute(start, end, contract))
        .collect()
}

/// Net quantity diagnostic.
///
/// A fully hedged book nets to zero at both dates. A non-zero sum is not an
/// error, but usually means a leg is missing or defaulted and the totals
/// should be read with care.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantityCheck {
    /// Sum of start quantities.
    pub total_start: f64,

    /// Sum of end quantities.
    pub total_end: f64,

    /// Absolute tolerance applied to both sums.
    pub tolerance: f64,
}

impl QuantityCheck {
    /// Sum quantities across positions and log a warning when unbalanced.
    pub fn from_positions(positions: &[PositionChange], tolerance: f64) -> Self {
        let check = Self {
            total_start: positions.iter().map(|p| p.qty_start).sum(),
            total_end: positions.iter().map(|p| p.qty_end).sum(),
            tolerance,
        };
        if !check.is_balanced() {
            tracing::warn!(
                total_start = check.total_start,
                total_end = check.total_end,
                "net quantity is not zero"
            );
        }
        check
    }

    /// Whether both sums are within tolerance of zero.
    pub fn is_balanced(&self) -> bool {
        self.total_start.abs() <= self.tolerance && self.total_end.abs() <= self.tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tables() -> (SnapshotTable, SnapshotTable) {
        let start = SnapshotTable::from_entries([
            ("Cash", Snapshot::new(100.0, 1000.0)),
            ("3M", Snapshot::new(-100.0, 980.0)),
            ("Closed", Snapshot::new(40.0, 500.0)),
        ]);
        let end = SnapshotTable::from_entries([
            ("Cash", Snapshot::new(50.0, 1050.0)),
            ("3M", Snapshot::new(-50.0, 1000.0)),
        ]);
        (start, end)
    }

    #[test]
    fn test_three_month_leg() {
        let (start, end) = tables();
        let change = PositionChange::compute(&start, &end, &"3M".into());
        assert_relative_eq!(change.price_change, 20.0);
        assert_relative_eq!(change.hold_pl, -2000.0);
        assert_relative_eq!(change.actual_pl, -1000.0);
        assert_relative_eq!(change.effect(), 1000.0);
    }

    #[test]
    fn test_contract_only_in_start_table() {
        let (start, end) = tables();
        let change = PositionChange::compute(&start, &end, &"Closed".into());
        assert_eq!(change.qty_end, 0.0);
        assert_eq!(change.price_end, 0.0);
        assert_eq!(change.actual_pl, 0.0);
        // hold_pl still uses the start quantity against the defaulted price
        assert_relative_eq!(change.hold_pl, 40.0 * -500.0);
    }

    #[test]
    fn test_contract_in_neither_table_is_zero() {
        let (start, end) = tables();
        let change = PositionChange::compute(&start, &end, &"M+7".into());
        assert_eq!(change.hold_pl, 0.0);
        assert_eq!(change.actual_pl, 0.0);
    }

    #[test]
    fn test_compute_all_keeps_order() {
        let (start, end) = tables();
        let contracts: Vec<ContractId> = vec!["3M".into(), "Cash".into()];
        let changes = compute_all(&start, &end, &contracts);
        assert_eq!(changes[0].contract.as_str(), "3M");
        assert_eq!(changes[1].contract.as_str(), "Cash");
    }

    #[test]
    fn test_strategy_accessors() {
        let (start, end) = tables();
        let change = PositionChange::compute(&start, &end, &"Cash".into());
        assert_eq!(change.quantity(Strategy::Hold), 100.0);
        assert_eq!(change.quantity(Strategy::Actual), 50.0);
        assert_eq!(change.pl(Strategy::Hold), change.hold_pl);
        assert_eq!(change.pl(Strategy::Actual), change.actual_pl);
    }

    #[test]
    fn test_quantity_check() {
        let (start, end) = tables();
        let pair: Vec<ContractId> = vec!["Cash".into(), "3M".into()];
        let hedged = compute_all(&start, &end, &pair);
        assert!(QuantityCheck::from_positions(&hedged, 0.01).is_balanced());

        let everything: Vec<ContractId> = vec!["Cash".into(), "3M".into(), "Closed".into()];
        let all = compute_all(&start, &end, &everything);
        let check = QuantityCheck::from_positions(&all, 0.01);
        assert!(!check.is_balanced());
        assert_relative_eq!(check.total_start, 40.0);
        assert_relative_eq!(check.total_end, 0.0);
    }
}
