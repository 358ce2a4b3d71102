//! Two-leg spread P/L.
//!
//! A spread between a near leg `i` and a far leg `j` is the price
//! difference `price(i) - price(j)`. Only the overlapping size of an
//! opposing long/short pair counts as a spread position:
//!
//! ```text
//! spread_delta(i,j)  = (pe_i - pe_j) - (ps_i - ps_j)
//! effective_qty(i,j) = min(|q_i|, |q_j|)   if q_i and q_j have opposite signs, else 0
//! direction(i,j)     = +1 (i long, j short), -1 (i short, j long), 0 otherwise
//! pl(i,j)            = effective_qty * spread_delta * direction
//! ```
//!
//! [`SpreadPl::from_legs`] is the single implementation of this formula. The
//! named Cash/3M view and every cell of the contribution matrix go through it.

use crate::error::{EngineError, Result};
use crate::position::PositionChange;
use crate::strategy::Strategy;
use serde::{Deserialize, Serialize};
use spreadmap_data::{ContractId, SnapshotTable};

/// Substring identifying the cash prompt.
pub const CASH_PATTERN: &str = "cash";

/// Substring identifying the three-month prompt.
pub const THREE_MONTH_PATTERN: &str = "3m";

/// Side of a pair relative to its near leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Near leg long, far leg short (+1)
    LongShort,
    /// Near leg short, far leg long (-1)
    ShortLong,
    /// Same side or a flat leg (0)
    Unpaired,
}

impl Direction {
    /// Classify a pair of quantities.
    pub fn between(near_qty: f64, far_qty: f64) -> Self {
        if near_qty > 0.0 && far_qty < 0.0 {
            Self::LongShort
        } else if near_qty < 0.0 && far_qty > 0.0 {
            Self::ShortLong
        } else {
            Self::Unpaired
        }
    }

    /// Numeric sign: `1.0`, `-1.0` or `0.0`.
    pub const fn sign(self) -> f64 {
        match self {
            Self::LongShort => 1.0,
            Self::ShortLong => -1.0,
            Self::Unpaired => 0.0,
        }
    }

    /// Direction seen from the other leg.
    pub const fn reverse(self) -> Self {
        match self {
            Self::LongShort => Self::ShortLong,
            Self::ShortLong => Self::LongShort,
            Self::Unpaired => Self::Unpaired,
        }
    }
}

/// Overlapping hedged size of two positions.
///
/// ```
/// use spreadmap_engine::effective_quantity;
///
/// assert_eq!(effective_quantity(100.0, -60.0), 60.0);
/// assert_eq!(effective_quantity(-30.0, 80.0), 30.0);
/// assert_eq!(effective_quantity(100.0, 60.0), 0.0);
/// assert_eq!(effective_quantity(0.0, -60.0), 0.0);
/// ```
pub fn effective_quantity(near_qty: f64, far_qty: f64) -> f64 {
    match Direction::between(near_qty, far_qty) {
        Direction::Unpaired => 0.0,
        _ => near_qty.abs().min(far_qty.abs()),
    }
}

/// Spread P/L of one ordered contract pair under one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadPl {
    /// Near leg (`i`).
    pub near: ContractId,

    /// Far leg (`j`).
    pub far: ContractId,

    /// Strategy whose quantities were used.
    pub strategy: Strategy,

    /// `price_start(i) - price_start(j)`.
    pub spread_start: f64,

    /// `price_end(i) - price_end(j)`.
    pub spread_end: f64,

    /// `spread_end - spread_start`.
    pub spread_delta: f64,

    /// Overlapping hedged size.
    pub effective_qty: f64,

    /// Side of the pair relative to the near leg.
    pub direction: Direction,

    /// `effective_qty * spread_delta * direction`.
    pub pl: f64,
}

impl SpreadPl {
    /// Spread P/L for `near`/`far` looked up in the snapshot tables.
    ///
    /// # Errors
    ///
    /// [`EngineError::SameContract`] when `near == far`, and
    /// [`EngineError::UnknownContract`] when a leg is in neither table.
    pub fn compute(
        start: &SnapshotTable,
        end: &SnapshotTable,
        near: &ContractId,
        far: &ContractId,
        strategy: Strategy,
    ) -> Result<Self> {
        for leg in [near, far] {
            if !start.contains(leg) && !end.contains(leg) {
                return Err(EngineError::UnknownContract(leg.clone()));
            }
        }
        let near = PositionChange::compute(start, end, near);
        let far = PositionChange::compute(start, end, far);
        Self::from_legs(&near, &far, strategy)
    }

    /// Spread P/L from two per-contract changes.
    ///
    /// # Errors
    ///
    /// [`EngineError::SameContract`] when both legs name the same contract.
    pub fn from_legs(near: &PositionChange, far: &PositionChange, strategy: Strategy) -> Result<Self> {
        if near.contract == far.contract {
            return Err(EngineError::SameContract(near.contract.clone()));
        }
        Ok(Self::from_distinct_legs(near, far, strategy))
    }

    /// Formula body; callers guarantee the legs differ.
    pub(crate) fn from_distinct_legs(
        near: &PositionChange,
        far: &PositionChange,
        strategy: Strategy,
    ) -> Self {
        let spread_start = near.price_start - far.price_start;
        let spread_end = near.price_end - far.price_end;
        let spread_delta = spread_end - spread_start;

        let near_qty = near.quantity(strategy);
        let far_qty = far.quantity(strategy);
        let effective_qty = effective_quantity(near_qty, far_qty);
        let direction = Direction::between(near_qty, far_qty);

        Self {
            near: near.contract.clone(),
            far: far.contract.clone(),
            strategy,
            spread_start,
            spread_end,
            spread_delta,
            effective_qty,
            direction,
            pl: effective_qty * spread_delta * direction.sign(),
        }
    }
}

/// Hold and Actual spread P/L of one named pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadComparison {
    /// Spread P/L with start-date quantities.
    pub hold: SpreadPl,

    /// Spread P/L with end-date quantities.
    pub actual: SpreadPl,
}

impl SpreadComparison {
    /// Compute both strategies for `near`/`far`.
    pub fn compute(
        start: &SnapshotTable,
        end: &SnapshotTable,
        near: &ContractId,
        far: &ContractId,
    ) -> Result<Self> {
        Ok(Self {
            hold: SpreadPl::compute(start, end, near, far, Strategy::Hold)?,
            actual: SpreadPl::compute(start, end, near, far, Strategy::Actual)?,
        })
    }

    /// `actual.pl - hold.pl`.
    pub fn effect(&self) -> f64 {
        self.actual.pl - self.hold.pl
    }
}

/// Locate the Cash and 3M prompts by case-insensitive substring.
///
/// When several labels match a pattern the last one in `contracts` wins.
/// Returns `None` if either is missing or both resolve to the same label.
///
/// ```
/// use spreadmap_data::ContractId;
/// use spreadmap_engine::find_cash_three_month;
///
/// let contracts: Vec<ContractId> = vec!["LME Cash".into(), "M+2".into(), "3m".into()];
/// let (cash, three_month) = find_cash_three_month(&contracts).unwrap();
/// assert_eq!(cash.as_str(), "LME Cash");
/// assert_eq!(three_month.as_str(), "3m");
///
/// let no_cash: Vec<ContractId> = vec!["M+2".into(), "3M".into()];
/// assert!(find_cash_three_month(&no_cash).is_none());
/// ```
pub fn find_cash_three_month(contracts: &[ContractId]) -> Option<(ContractId, ContractId)> {
    let last_match = |pattern: &str| {
        contracts
            .iter()
            .rev()
            .find(|c| c.contains_ignore_case(pattern))
            .cloned()
    };
    let cash = last_match(CASH_PATTERN);
    let three_month = last_match(THREE_MONTH_PATTERN);

    match (cash, three_month) {
        (Some(cash), Some(three_month)) if cash != three_month => Some((cash, three_month)),
        _ => {
            tracing::warn!("Cash/3M pair not found among contracts");
            None
        }
    }
}
