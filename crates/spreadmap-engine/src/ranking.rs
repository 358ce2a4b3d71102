//! Ranking of contract pairs by P/L magnitude.

use crate::matrix::ContributionMatrix;
use serde::{Deserialize, Serialize};
use spreadmap_data::ContractId;

/// A matrix cell with its rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPair {
    /// 1-based rank.
    pub rank: usize,
    /// Near leg.
    pub from: ContractId,
    /// Far leg.
    pub to: ContractId,
    /// Spread P/L.
    pub pl: f64,
}

/// Off-diagonal cells sorted by descending `|pl|`.
///
/// Ties keep row-major `(i, j)` order.
pub fn rank(matrix: &ContributionMatrix) -> Vec<RankedPair> {
    let mut pairs: Vec<_> = matrix.pairs().collect();
    pairs.sort_by(|a, b| b.pl.abs().total_cmp(&a.pl.abs()));

    pairs
        .into_iter()
        .enumerate()
        .map(|(idx, p)| RankedPair {
            rank: idx + 1,
            from: p.from.clone(),
            to: p.to.clone(),
            pl: p.pl,
        })
        .collect()
}
