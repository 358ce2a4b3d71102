//! Pairwise spread contribution matrix.
//!
//! Cell `(i, j)` holds the spread P/L of near leg `i` against far leg `j`
//! computed by [`SpreadPl`]. The diagonal is not applicable and is stored as
//! `None`. Because `direction` and `spread_delta` both flip sign when the
//! legs swap, the matrix is exactly symmetric.
//!
//! Cells are independent, so they are filled in parallel with ndarray's
//! rayon-backed [`Zip`]. Nothing random enters the computation; the same
//! inputs always give the same bits.

use crate::error::{EngineError, Result};
use crate::position::{PositionChange, compute_all};
use crate::spread::SpreadPl;
use crate::strategy::Strategy;
use ndarray::{Array2, Zip};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use spreadmap_data::{ContractId, SnapshotTable};
use std::collections::HashSet;
use std::fmt;

/// Which quantities feed the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixMode {
    /// Start-date quantities
    Hold,
    /// End-date quantities
    Actual,
    /// `Actual - Hold`, cell by cell
    Delta,
}

impl MatrixMode {
    /// Strategy behind a single-strategy mode; `None` for `Delta`.
    pub const fn strategy(self) -> Option<Strategy> {
        match self {
            Self::Hold => Some(Strategy::Hold),
            Self::Actual => Some(Strategy::Actual),
            Self::Delta => None,
        }
    }
}

impl From<Strategy> for MatrixMode {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Hold => Self::Hold,
            Strategy::Actual => Self::Actual,
        }
    }
}

impl fmt::Display for MatrixMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hold => write!(f, "Hold"),
            Self::Actual => write!(f, "Actual"),
            Self::Delta => write!(f, "Actual - Hold"),
        }
    }
}

/// One off-diagonal cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairContribution<'a> {
    /// Row index (near leg).
    pub row: usize,
    /// Column index (far leg).
    pub col: usize,
    /// Near leg.
    pub from: &'a ContractId,
    /// Far leg.
    pub to: &'a ContractId,
    /// Spread P/L of the pair.
    pub pl: f64,
}

/// N×N spread P/L decomposition over a contract universe.
#[derive(Debug, Clone, PartialEq)]
pub struct ContributionMatrix {
    contracts: Vec<ContractId>,
    mode: MatrixMode,
    cells: Array2<Option<f64>>,
}

impl ContributionMatrix {
    /// Build the matrix for `contracts` (rows and columns in that order).
    ///
    /// # Errors
    ///
    /// Fails when the universe is empty, lists a contract twice, or names a
    /// contract present in neither table.
    ///
    /// # Examples
    ///
    /// ```
    /// use spreadmap_data::{ContractId, Snapshot, SnapshotTable};
    /// use spreadmap_engine::{ContributionMatrix, MatrixMode};
    ///
    /// let start = SnapshotTable::from_entries([
    ///     ("Cash", Snapshot::new(100.0, 1000.0)),
    ///     ("3M", Snapshot::new(-100.0, 980.0)),
    /// ]);
    /// let end = SnapshotTable::from_entries([
    ///     ("Cash", Snapshot::new(50.0, 1050.0)),
    ///     ("3M", Snapshot::new(-50.0, 1000.0)),
    /// ]);
    /// let contracts: Vec<ContractId> = start.contracts().cloned().collect();
    ///
    /// let hold = ContributionMatrix::build(&start, &end, &contracts, MatrixMode::Hold).unwrap();
    /// assert_eq!(hold.get(0, 1), Some(3000.0));
    /// assert_eq!(hold.get(0, 0), None);
    /// assert_eq!(hold.total(), 3000.0);
    /// ```
    pub fn build(
        start: &SnapshotTable,
        end: &SnapshotTable,
        contracts: &[ContractId],
        mode: MatrixMode,
    ) -> Result<Self> {
        if let Some(missing) = contracts
            .iter()
            .find(|c| !start.contains(c) && !end.contains(c))
        {
            return Err(EngineError::UnknownContract(missing.clone()));
        }

        let legs = compute_all(start, end, contracts);
        match mode.strategy() {
            Some(strategy) => Self::from_positions(&legs, strategy),
            None => {
                let hold = Self::from_positions(&legs, Strategy::Hold)?;
                let actual = Self::from_positions(&legs, Strategy::Actual)?;
                Self::difference(&actual, &hold)
            }
        }
    }

    /// Build a single-strategy matrix from per-contract changes.
    pub fn from_positions(legs: &[PositionChange], strategy: Strategy) -> Result<Self> {
        if legs.is_empty() {
            return Err(EngineError::EmptyUniverse);
        }
        let mut seen = HashSet::with_capacity(legs.len());
        if let Some(dup) = legs.iter().find(|leg| !seen.insert(&leg.contract)) {
            return Err(EngineError::DuplicateContract(dup.contract.clone()));
        }

        let n = legs.len();
        let mut cells = Array2::from_elem((n, n), None);
        Zip::indexed(&mut cells).par_for_each(|(i, j), cell| {
            if i != j {
                *cell = Some(SpreadPl::from_distinct_legs(&legs[i], &legs[j], strategy).pl);
            }
        });

        tracing::debug!(contracts = n, %strategy, "built contribution matrix");

        Ok(Self {
            contracts: legs.iter().map(|leg| leg.contract.clone()).collect(),
            mode: strategy.into(),
            cells,
        })
    }

    /// Cell-wise `actual - hold`. The diagonal stays not applicable.
    ///
    /// # Errors
    ///
    /// [`EngineError::ModeMismatch`] when the inputs are not an Actual and a
    /// Hold matrix, [`EngineError::UniverseMismatch`] when their contracts
    /// differ.
    pub fn difference(actual: &Self, hold: &Self) -> Result<Self> {
        for (matrix, expected) in [(actual, MatrixMode::Actual), (hold, MatrixMode::Hold)] {
            if matrix.mode != expected {
                return Err(EngineError::ModeMismatch {
                    expected,
                    actual: matrix.mode,
                });
            }
        }
        if actual.contracts != hold.contracts {
            return Err(EngineError::UniverseMismatch);
        }

        let cells = Zip::from(&actual.cells)
            .and(&hold.cells)
            .map_collect(|a, h| match (a, h) {
                (Some(a), Some(h)) => Some(a - h),
                _ => None,
            });

        Ok(Self {
            contracts: actual.contracts.clone(),
            mode: MatrixMode::Delta,
            cells,
        })
    }

    /// Value at `(row, col)`; `None` on the diagonal or out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.cells.get((row, col)).copied().flatten()
    }

    /// Value for a named pair.
    pub fn get_pair(&self, from: &ContractId, to: &ContractId) -> Option<f64> {
        let row = self.position(from)?;
        let col = self.position(to)?;
        self.get(row, col)
    }

    /// Row/column index of a contract.
    pub fn position(&self, contract: &ContractId) -> Option<usize> {
        self.contracts.iter().position(|c| c == contract)
    }

    /// Contracts labelling rows and columns.
    pub fn contracts(&self) -> &[ContractId] {
        &self.contracts
    }

    /// Mode the matrix was built with.
    pub const fn mode(&self) -> MatrixMode {
        self.mode
    }

    /// Number of contracts (the matrix is `len × len`).
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// Whether the matrix has no contracts.
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Raw cells.
    pub const fn cells(&self) -> &Array2<Option<f64>> {
        &self.cells
    }

    /// Off-diagonal cells in row-major order.
    pub fn pairs(&self) -> impl Iterator<Item = PairContribution<'_>> + '_ {
        self.cells.indexed_iter().filter_map(move |((row, col), cell)| {
            cell.map(|pl| PairContribution {
                row,
                col,
                from: &self.contracts[row],
                to: &self.contracts[col],
                pl,
            })
        })
    }

    /// Spread P/L with each unordered pair counted once (upper triangle).
    pub fn total(&self) -> f64 {
        self.pairs().filter(|p| p.row < p.col).map(|p| p.pl).sum()
    }

    /// Sum over every off-diagonal cell; twice [`total`](Self::total).
    pub fn ordered_total(&self) -> f64 {
        self.pairs().map(|p| p.pl).sum()
    }

    /// Largest absolute cell value, `0.0` when there are no cells.
    pub fn max_abs(&self) -> f64 {
        self.pairs().fold(0.0, |acc, p| acc.max(p.pl.abs()))
    }

    /// Whether `(i, j)` and `(j, i)` hold identical values everywhere.
    pub fn is_symmetric(&self) -> bool {
        let n = self.len();
        (0..n).all(|i| (i + 1..n).all(|j| self.get(i, j) == self.get(j, i)))
    }

    /// Rows as nested vectors, `None` on the diagonal.
    pub fn to_rows(&self) -> Vec<Vec<Option<f64>>> {
        self.cells.rows().into_iter().map(|row| row.to_vec()).collect()
    }
}

impl Serialize for ContributionMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ContributionMatrix", 3)?;
        state.serialize_field("mode", &self.mode)?;
        state.serialize_field("contracts", &self.contracts)?;
        state.serialize_field("cells", &self.to_rows())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use spreadmap_data::Snapshot;

    fn ladder() -> (SnapshotTable, SnapshotTable, Vec<ContractId>) {
        let start = SnapshotTable::from_entries([
            ("Cash", Snapshot::new(100.0, 1000.0)),
            ("3M", Snapshot::new(-60.0, 980.0)),
            ("M+4", Snapshot::new(-40.0, 975.0)),
        ]);
        let end = SnapshotTable::from_entries([
            ("Cash", Snapshot::new(80.0, 1040.0)),
            ("3M", Snapshot::new(-20.0, 1001.0)),
            ("M+4", Snapshot::new(-60.0, 990.0)),
        ]);
        let contracts = start.contracts().cloned().collect();
        (start, end, contracts)
    }

    #[test]
    fn test_hold_cells() {
        let (start, end, contracts) = ladder();
        let m = ContributionMatrix::build(&start, &end, &contracts, MatrixMode::Hold).unwrap();
        // Cash/3M: spread 20 -> 39, qty min(100, 60)
        assert_relative_eq!(m.get(0, 1).unwrap(), 60.0 * 19.0);
        // Cash/M+4: spread 25 -> 50, qty min(100, 40)
        assert_relative_eq!(m.get(0, 2).unwrap(), 40.0 * 25.0);
        // 3M/M+4 are both short
        assert_eq!(m.get(1, 2), Some(0.0));
    }

    #[test]
    fn test_diagonal_is_not_applicable_in_every_mode() {
        let (start, end, contracts) = ladder();
        for mode in [MatrixMode::Hold, MatrixMode::Actual, MatrixMode::Delta] {
            let m = ContributionMatrix::build(&start, &end, &contracts, mode).unwrap();
            for i in 0..m.len() {
                assert_eq!(m.get(i, i), None);
            }
            assert_eq!(m.pairs().count(), 6);
        }
    }

    #[test]
    fn test_delta_is_actual_minus_hold() {
        let (start, end, contracts) = ladder();
        let hold = ContributionMatrix::build(&start, &end, &contracts, MatrixMode::Hold).unwrap();
        let actual =
            ContributionMatrix::build(&start, &end, &contracts, MatrixMode::Actual).unwrap();
        let delta = ContributionMatrix::build(&start, &end, &contracts, MatrixMode::Delta).unwrap();
        assert_eq!(delta.mode(), MatrixMode::Delta);
        for p in delta.pairs() {
            let expected = actual.get(p.row, p.col).unwrap() - hold.get(p.row, p.col).unwrap();
            assert_eq!(p.pl, expected);
        }
    }

    #[test]
    fn test_totals() {
        let (start, end, contracts) = ladder();
        let m = ContributionMatrix::build(&start, &end, &contracts, MatrixMode::Hold).unwrap();
        assert_relative_eq!(m.total(), 60.0 * 19.0 + 40.0 * 25.0);
        assert_relative_eq!(m.ordered_total(), 2.0 * m.total());
        assert_relative_eq!(m.max_abs(), 60.0 * 19.0);
        assert!(m.is_symmetric());
    }

    #[test]
    fn test_get_pair_by_label() {
        let (start, end, contracts) = ladder();
        let m = ContributionMatrix::build(&start, &end, &contracts, MatrixMode::Hold).unwrap();
        assert_eq!(m.get_pair(&"M+4".into(), &"Cash".into()), m.get(2, 0));
        assert_eq!(m.get_pair(&"Cash".into(), &"Nope".into()), None);
        assert_eq!(m.get(5, 0), None);
    }

    #[test]
    fn test_precondition_errors() {
        let (start, end, _) = ladder();
        let empty: Vec<ContractId> = Vec::new();
        assert!(matches!(
            ContributionMatrix::build(&start, &end, &empty, MatrixMode::Hold),
            Err(EngineError::EmptyUniverse)
        ));

        let dup: Vec<ContractId> = vec!["Cash".into(), "3M".into(), "Cash".into()];
        assert!(matches!(
            ContributionMatrix::build(&start, &end, &dup, MatrixMode::Actual),
            Err(EngineError::DuplicateContract(_))
        ));

        let unknown: Vec<ContractId> = vec!["Cash".into(), "Ghost".into()];
        assert!(matches!(
            ContributionMatrix::build(&start, &end, &unknown, MatrixMode::Delta),
            Err(EngineError::UnknownContract(_))
        ));
    }

    #[test]
    fn test_difference_checks_modes() {
        let (start, end, contracts) = ladder();
        let hold = ContributionMatrix::build(&start, &end, &contracts, MatrixMode::Hold).unwrap();
        assert!(matches!(
            ContributionMatrix::difference(&hold, &hold),
            Err(EngineError::ModeMismatch { .. })
        ));
    }

    #[test]
    fn test_single_contract_has_no_pairs() {
        let (start, end, _) = ladder();
        let one: Vec<ContractId> = vec!["Cash".into()];
        let m = ContributionMatrix::build(&start, &end, &one, MatrixMode::Actual).unwrap();
        assert_eq!(m.pairs().count(), 0);
        assert_eq!(m.total(), 0.0);
        assert_eq!(m.max_abs(), 0.0);
    }

    #[test]
    fn test_to_rows_shape() {
        let (start, end, contracts) = ladder();
        let m = ContributionMatrix::build(&start, &end, &contracts, MatrixMode::Hold).unwrap();
        let rows = m.to_rows();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.len() == 3));
        assert_eq!(rows[1][1], None);
    }
}
